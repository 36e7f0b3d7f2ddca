mod aggregate;
mod deep_link;
mod filter;
mod state;

pub use aggregate::{industries, industry_counts, technology_counts};
pub use deep_link::{append_detail_token, detail_token, parse_detail_token, strip_detail_token};
pub use filter::{
    ALL_INDUSTRIES, ALL_TECHNOLOGIES, CatalogueFilter, IndustryFilter, KNOWN_TECHNOLOGIES,
    TechnologyFilter,
};
pub use state::{
    CATALOGUE_FRAGMENT_PREFIX, CATALOGUE_KEY, CatalogueError, CatalogueState, DETAIL_CONTAINER,
};
