//! Typed launch-map record
//!
//! One row of the consolidated table. Columns are positional in the source
//! workbook and named in the store, so the record, its column enum and the
//! header names are generated together from a single table.

pub mod status;

use chrono::NaiveDate;

pub use status::{BadgeState, StatusBucket};

/// Placeholder shown for any field without a value
pub const PLACEHOLDER: &str = "-";

/// Owned value used when filling a record column from an outside source
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Date(NaiveDate),
}

impl FieldValue {
    fn into_text(self) -> Option<String> {
        match self {
            FieldValue::Text(s) if s.trim().is_empty() => None,
            FieldValue::Text(s) => Some(s),
            FieldValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        }
    }

    fn into_date(self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(d),
            FieldValue::Text(s) => crate::ingest::dates::parse_text_date(&s),
        }
    }
}

/// Borrowed view of a record column
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldRef<'a> {
    Text(&'a str),
    Date(NaiveDate),
}

impl<'a> From<&'a String> for FieldRef<'a> {
    fn from(s: &'a String) -> Self {
        FieldRef::Text(s)
    }
}

impl From<&NaiveDate> for FieldRef<'_> {
    fn from(d: &NaiveDate) -> Self {
        FieldRef::Date(*d)
    }
}

impl FieldRef<'_> {
    /// Storage form: dates as ISO `YYYY-MM-DD`, text unchanged
    pub fn to_stored(self) -> String {
        match self {
            FieldRef::Text(s) => s.to_string(),
            FieldRef::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }

    /// Display form: dates as `DD/MM/YYYY`, text unchanged
    pub fn to_display(self) -> String {
        match self {
            FieldRef::Text(s) => s.to_string(),
            FieldRef::Date(d) => d.format("%d/%m/%Y").to_string(),
        }
    }
}

macro_rules! launch_record {
    ($( $variant:ident, $field:ident : $kind:ident => $header:literal; )*) => {
        /// A column of the consolidated table, in stored order
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Column {
            $( $variant, )*
        }

        impl Column {
            pub const ALL: &'static [Column] = &[ $( Column::$variant, )* ];

            /// Column name used in the store and in the audit spreadsheet
            pub fn header(self) -> &'static str {
                match self {
                    $( Column::$variant => $header, )*
                }
            }

            pub fn is_date(self) -> bool {
                match self {
                    $( Column::$variant => launch_record!(@is_date $kind), )*
                }
            }

            pub fn from_header(name: &str) -> Option<Column> {
                let name = name.trim();
                Column::ALL.iter().copied().find(|c| c.header() == name)
            }
        }

        /// One consolidated launch request
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct LaunchRecord {
            $( pub $field: Option<launch_record!(@ty $kind)>, )*
        }

        impl LaunchRecord {
            pub fn get(&self, column: Column) -> Option<FieldRef<'_>> {
                match column {
                    $( Column::$variant => self.$field.as_ref().map(FieldRef::from), )*
                }
            }

            pub fn set(&mut self, column: Column, value: FieldValue) {
                match column {
                    $( Column::$variant => self.$field = launch_record!(@assign $kind value), )*
                }
            }

            pub fn clear(&mut self, column: Column) {
                match column {
                    $( Column::$variant => self.$field = None, )*
                }
            }
        }
    };
    (@ty text) => { String };
    (@ty date) => { NaiveDate };
    (@is_date text) => { false };
    (@is_date date) => { true };
    (@assign text $value:ident) => { $value.into_text() };
    (@assign date $value:ident) => { $value.into_date() };
}

launch_record! {
    Requester, requester: text => "Solicitante";
    InclusionDate, inclusion_date: date => "Data da Inclusão";
    Ean, ean: text => "EAN";
    Plu, plu: text => "PLU";
    Description, description: text => "Descrição do produto";
    Kind, kind: text => "Tipo";
    SupplierNumber, supplier_number: text => "Nº Fornecedor";
    ProductNumber, product_number: text => "Nº Produto";
    Category, category: text => "Categoria";
    Subcategory, subcategory: text => "Subcategoria";
    GroupCode, group_code: text => "Cod Grupo";
    GroupSolution, group_solution: text => "Grupo Solução";
    SubgroupCode, subgroup_code: text => "Cod Subgrupo";
    SubgroupSolution, subgroup_solution: text => "Subgrupo Solução";
    PackagingItem, packaging_item: text => "Item de ME";
    ReplacementItem, replacement_item: text => "Item Substituto";
    LaunchForecast, launch_forecast: date => "Previsão de Lançamento";
    CommercialNote, commercial_note: text => "Observação Comercial";
    SuggestedBrand, suggested_brand: text => "Sugestão Bandeira";
    SuggestedRegion, suggested_region: text => "Sugestão Região";
    SuggestedProfile, suggested_profile: text => "Sugestão Perfil";
    SuggestedSize, suggested_size: text => "Sugestão Tamanho";
    SpecificStores, specific_stores: text => "Lojas Especificas Nº LOJA";
    CommercialPlanning, commercial_planning: text => "Planejamento Comercial";
    Status, status: text => "STATUS";
    ValidatedBrand, validated_brand: text => "Decisão Validada - Bandeira";
    ValidatedRegion, validated_region: text => "Decisão Validada - Região";
    ValidatedProfile, validated_profile: text => "Decisão Validada - Perfil";
    ValidatedSize, validated_size: text => "Decisão Validada - Tamanho";
    DefinedStores, defined_stores: text => "Lojas Definidas Nº LOJA";
    ApprovalOwner, approval_owner: text => "Responsável pela aprovação (\"GCAT\" + \"COMERCIAL\")";
    Remarks, remarks: text => "Observação";
    ClusterStatus, cluster_status: text => "Status de cluster";
    ValidationDate, validation_date: date => "Data de Validação";
    TurnaroundTime, turnaround_time: text => "Tempo de Retorno";
    Origin, origin: text => "Origem";
    Provider, provider: text => "Nome Provedor";
    Inconsistencies, inconsistencies: text => "Inconsistências";
}

/// Number of positional columns carried by the source sheets
pub const SOURCE_COLUMN_COUNT: usize = 35;

impl Column {
    /// The positional columns of a source sheet, in order
    pub fn source_columns() -> &'static [Column] {
        &Column::ALL[..SOURCE_COLUMN_COUNT]
    }

    pub fn date_columns() -> impl Iterator<Item = Column> {
        Column::ALL.iter().copied().filter(|c| c.is_date())
    }
}

impl LaunchRecord {
    /// Display text for a column, `-` when unset
    pub fn display(&self, column: Column) -> String {
        self.get(column)
            .map(FieldRef::to_display)
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }

    /// True when requester, EAN and PLU are all unset
    pub fn lacks_identity(&self) -> bool {
        [&self.requester, &self.ean, &self.plu]
            .iter()
            .all(|v| v.as_deref().is_none_or(|s| s.trim().is_empty()))
    }
}
