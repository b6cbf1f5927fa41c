// Business logic services layer
//
// Logic shared by the web page and its tests, kept free of HTTP concerns.

pub mod search;
