//! Hash-fragment routing: fragment grammar, ordered route matching, page
//! dispatch and per-route document metadata.

mod breadcrumbs;
mod fragment;
mod meta;
mod navigation;
mod route;

pub use breadcrumbs::{derive_breadcrumbs, nav_label};
pub use fragment::{Fragment, encode_query, parse_query};
pub use meta::{NOT_FOUND_KEY, blog_post_meta, derive_page_meta, detail_content, project_meta};
pub use navigation::{Navigation, Router};
pub use route::{
    MatchResult, Page, ResolvedPage, RouteConfig, RouteTable, RouterError, default_routes,
};
