//! Provider-roster data-quality dashboard: a fixed battery of aggregate
//! queries, run concurrently, reduced to the figures and charts the view shows.

pub mod catalog;
pub mod fanout;
pub mod metrics;
pub mod view;

pub use catalog::{AggregateQuery, DASHBOARD_CATALOG};
pub use fanout::{NamedResultBundle, QueryFanoutExecutor};
pub use metrics::{DashboardAggregator, DerivedMetrics};
pub use view::{
    CardMetric, Dashboard, DashboardSnapshot, ProblemCard, QuickAction, StatCard, QUICK_ACTIONS,
};
