//! HTML rendering for the lookup page

use std::fmt::Write as _;

use crate::config::repository::records::ColumnConversionWarning;
use crate::record::{BadgeState, Column, LaunchRecord, status::AWAITING_LABEL};
use crate::services::search::StatusCounts;

const PAGE_STYLE: &str = "\
body{font-family:sans-serif;margin:0 auto;max-width:1200px;padding:24px;background:#f5f6f8;color:#222}\
.banner{padding:12px 16px;border-radius:8px;margin:12px 0}\
.banner.info{background:#e7f1fb;color:#0b4f8a}\
.banner.success{background:#e6f4ea;color:#1e6b34}\
.banner.warning{background:#fff4e0;color:#8a5a00}\
.banner.error{background:#fdecea;color:#8a1c1c}\
.metrics{display:flex;gap:16px;margin:16px 0}\
.metric{flex:1;background:#fff;border-radius:8px;padding:12px 16px}\
.metric strong{display:block;font-size:28px}\
.card{background:#fff;padding:20px;border-radius:12px;box-shadow:0 2px 8px rgba(0,0,0,0.1);margin-bottom:20px}\
.card table{width:100%;font-size:14px;border-collapse:collapse}\
.card td{padding:4px 8px;vertical-align:top}\
.badge{color:#fff;padding:4px 10px;border-radius:8px;font-size:13px}\
form.search{display:flex;gap:16px}\
form.search label{flex:1}\
input[type=text],input[type=password]{width:100%;padding:8px;box-sizing:border-box}";

/// Card layout: rows of labelled columns
const CARD_ROWS: &[&[(&str, Column)]] = &[
    &[
        ("Sugestão Região", Column::SuggestedRegion),
        ("Decisão Validada - Região", Column::ValidatedRegion),
    ],
    &[
        ("Solicitante", Column::Requester),
        ("Data da Inclusão", Column::InclusionDate),
        ("EAN", Column::Ean),
        ("PLU", Column::Plu),
    ],
    &[
        ("Tipo", Column::Kind),
        ("Nº Fornecedor", Column::SupplierNumber),
        ("Nº Produto", Column::ProductNumber),
    ],
    &[
        ("Categoria", Column::Category),
        ("Subcategoria", Column::Subcategory),
        ("Cod Grupo", Column::GroupCode),
        ("Cod Subgrupo", Column::SubgroupCode),
    ],
    &[
        ("Grupo Solução", Column::GroupSolution),
        ("Subgrupo Solução", Column::SubgroupSolution),
        ("Item de ME", Column::PackagingItem),
        ("Previsão de Lançamento", Column::LaunchForecast),
    ],
    &[
        ("Sugestão Bandeira", Column::SuggestedBrand),
        ("Decisão Validada - Bandeira", Column::ValidatedBrand),
        ("Sugestão Perfil", Column::SuggestedProfile),
        ("Decisão Validada - Perfil", Column::ValidatedProfile),
    ],
    &[
        ("Sugestão Tamanho", Column::SuggestedSize),
        ("Decisão Validada - Tamanho", Column::ValidatedSize),
        ("Lojas Especificas Nº LOJA", Column::SpecificStores),
        ("Planejamento Comercial", Column::CommercialPlanning),
    ],
    &[
        ("Status de cluster", Column::ClusterStatus),
        ("Lojas Definidas Nº LOJA", Column::DefinedStores),
        ("Observação Comercial", Column::CommercialNote),
        ("Item Substituto", Column::ReplacementItem),
    ],
    &[
        ("Responsável pela Aprovação", Column::ApprovalOwner),
        ("Observação", Column::Remarks),
        ("Tempo de Retorno", Column::TurnaroundTime),
        ("Data de Validação", Column::ValidationDate),
    ],
    &[
        ("Origem", Column::Origin),
        ("Nome Provedor", Column::Provider),
        ("Inconsistências", Column::Inconsistencies),
    ],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Info,
    Success,
    Warning,
    Error,
}

impl BannerKind {
    fn class(self) -> &'static str {
        match self {
            BannerKind::Info => "info",
            BannerKind::Success => "success",
            BannerKind::Warning => "warning",
            BannerKind::Error => "error",
        }
    }
}

/// Escape text for use in HTML content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn banner(kind: BannerKind, message: &str) -> String {
    format!(
        "<div class=\"banner {}\">{}</div>",
        kind.class(),
        escape_html(message)
    )
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"pt-BR\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape_html(title),
        PAGE_STYLE,
        body
    )
}

/// Password prompt, with an optional error banner
pub fn login_page(error: Option<&str>) -> String {
    let mut body = String::from("<h1>🔒 Acesso restrito</h1>\n");
    if let Some(message) = error {
        body.push_str(&banner(BannerKind::Error, message));
    }
    body.push_str(
        "<form method=\"post\" action=\"/login\">\n\
         <label>Digite a senha para acessar:\n\
         <input type=\"password\" name=\"senha\" autofocus></label>\n\
         <button type=\"submit\">Entrar</button>\n\
         </form>",
    );
    page("Acesso restrito", &body)
}

/// Badge with icon and colour for a status text
pub fn status_badge(status: Option<&str>) -> String {
    let state = BadgeState::of(status);
    let text = match status.map(str::trim) {
        None | Some("") => AWAITING_LABEL,
        Some(s) => s,
    };
    format!(
        "<span class=\"badge\" style=\"background-color:{}\">{} {}</span>",
        state.color(),
        state.icon(),
        escape_html(text)
    )
}

/// One record card
pub fn record_card(record: &LaunchRecord) -> String {
    let title = record
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or("Sem descrição");

    let mut html = String::new();
    let _ = writeln!(
        html,
        "<div class=\"card\">\n<h4>{} {}</h4>\n<table>",
        escape_html(title),
        status_badge(record.status.as_deref())
    );
    for row in CARD_ROWS {
        html.push_str("<tr>");
        for (label, column) in row.iter() {
            let _ = write!(
                html,
                "<td><strong>{}:</strong> {}</td>",
                escape_html(label),
                escape_html(&record.display(*column))
            );
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n</div>\n");
    html
}

fn metrics(counts: &StatusCounts) -> String {
    format!(
        "<div class=\"metrics\">\
         <div class=\"metric\">✅ Aprovados<strong>{}</strong></div>\
         <div class=\"metric\">❌ Rejeitados<strong>{}</strong></div>\
         <div class=\"metric\">🕒 Aguardando<strong>{}</strong></div>\
         </div>",
        counts.approved, counts.rejected, counts.awaiting
    )
}

fn search_form(code: &str, requester: &str) -> String {
    format!(
        "<form class=\"search\" method=\"get\" action=\"/\">\n\
         <label>Digite o PLU ou EAN:<input type=\"text\" name=\"codigo\" value=\"{}\"></label>\n\
         <label>Filtrar por solicitante (insensitive):<input type=\"text\" name=\"solicitante\" value=\"{}\"></label>\n\
         <button type=\"submit\">Buscar</button>\n\
         </form>\n\
         <form method=\"post\" action=\"/logout\"><button type=\"submit\">Sair</button></form>",
        escape_html(code),
        escape_html(requester)
    )
}

/// Content of the search page below the form
#[derive(Debug)]
pub enum SearchOutcome<'a> {
    /// The store could not be read
    Unavailable(String),
    /// No filter supplied yet
    Prompt { counts: StatusCounts },
    Results {
        counts: StatusCounts,
        records: Vec<&'a LaunchRecord>,
    },
}

/// Inputs echoed back into the search form
#[derive(Debug, Default, Clone, Copy)]
pub struct FormValues<'a> {
    pub code: &'a str,
    pub requester: &'a str,
}

pub fn search_page(
    form: FormValues<'_>,
    warnings: &[ColumnConversionWarning],
    outcome: &SearchOutcome<'_>,
) -> String {
    let mut body = String::from("<h1>🔎 Consulta de Cadastro de Produtos</h1>\n");
    body.push_str(&search_form(form.code, form.requester));
    body.push('\n');

    for warning in warnings {
        body.push_str(&banner(BannerKind::Warning, &warning.to_string()));
    }

    match outcome {
        SearchOutcome::Unavailable(message) => {
            body.push_str(&banner(
                BannerKind::Error,
                &format!("Erro ao conectar no banco de dados: {}", message),
            ));
        }
        SearchOutcome::Prompt { counts } => {
            body.push_str(&metrics(counts));
            body.push_str(&banner(
                BannerKind::Info,
                "Digite um PLU/EAN ou informe um solicitante para iniciar a consulta.",
            ));
        }
        SearchOutcome::Results { counts, records } => {
            body.push_str(&metrics(counts));
            body.push_str(&banner(
                BannerKind::Success,
                &format!("{} produto(s) encontrado(s).", records.len()),
            ));
            if records.is_empty() {
                body.push_str(&banner(BannerKind::Warning, "Nenhum resultado encontrado."));
            }
            for record in records {
                body.push_str(&record_card(record));
            }
        }
    }

    page("Consulta Mapa", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"A" & 'B'</b>"#),
            "&lt;b&gt;&quot;A&quot; &amp; &#39;B&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_status_badge_states() {
        let badge = status_badge(None);
        assert!(badge.contains("#888"));
        assert!(badge.contains("⏳ Aguardando validação"));

        let badge = status_badge(Some("Aprovado com ressalvas"));
        assert!(badge.contains("#28a745"));
        assert!(badge.contains("✅ Aprovado com ressalvas"));

        let badge = status_badge(Some("Em análise"));
        assert!(badge.contains("#6c757d"));
        assert!(badge.contains("ℹ️"));
    }

    #[test]
    fn test_card_uses_placeholders_and_escapes() {
        let record = LaunchRecord {
            ean: Some("7891234567890".into()),
            requester: Some("<script>".into()),
            inclusion_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 5),
            ..Default::default()
        };
        let html = record_card(&record);

        assert!(html.contains("<h4>Sem descrição "));
        assert!(html.contains("<strong>EAN:</strong> 7891234567890"));
        assert!(html.contains("<strong>PLU:</strong> -"));
        assert!(html.contains("<strong>Data da Inclusão:</strong> 05/01/2024"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_card_lists_every_column() {
        let mut columns: Vec<Column> = CARD_ROWS
            .iter()
            .flat_map(|row| row.iter().map(|(_, c)| *c))
            .collect();
        // Description is the title, status is the badge
        columns.push(Column::Description);
        columns.push(Column::Status);

        for column in Column::ALL {
            assert!(columns.contains(column), "missing {:?}", column);
        }
    }

    #[test]
    fn test_search_page_banners() {
        let records = [LaunchRecord::default()];
        let outcome = SearchOutcome::Results {
            counts: StatusCounts::default(),
            records: records.iter().collect(),
        };
        let html = search_page(FormValues::default(), &[], &outcome);
        assert!(html.contains("1 produto(s) encontrado(s)."));
        assert!(!html.contains("Nenhum resultado encontrado."));

        let outcome = SearchOutcome::Results {
            counts: StatusCounts::default(),
            records: Vec::new(),
        };
        let html = search_page(FormValues::default(), &[], &outcome);
        assert!(html.contains("0 produto(s) encontrado(s)."));
        assert!(html.contains("Nenhum resultado encontrado."));
    }

    #[test]
    fn test_search_page_warning_and_prompt() {
        let warnings = vec![ColumnConversionWarning {
            column: "Data de Validação".into(),
            reason: "1 valores não reconhecidos como data".into(),
        }];
        let outcome = SearchOutcome::Prompt {
            counts: StatusCounts {
                approved: 2,
                rejected: 1,
                awaiting: 0,
            },
        };
        let html = search_page(
            FormValues {
                code: "",
                requester: "a\"b",
            },
            &warnings,
            &outcome,
        );
        assert!(html.contains("Erro ao converter coluna Data de Validação"));
        assert!(html.contains("iniciar a consulta"));
        assert!(html.contains("value=\"a&quot;b\""));
        assert!(html.contains("Aprovados<strong>2</strong>"));
    }
}
