//! Routing primitives shared by every extension point that produces routes.
//!
//! Contributors describe routes as [`RouteTable`]s; assemblers concatenate,
//! prefix and namespace those tables, and the server finally turns the
//! merged table into one `axum::Router`.

pub mod pattern;
pub mod table;
pub mod view;
pub mod viewset;

pub use pattern::RoutePattern;
pub use table::{PathCaptures, Route, RouteSummary, RouteTable};
pub use view::{HandlerView, ViewClass};
pub use viewset::{ViewSet, ViewSetAction};
