pub mod normalize;
pub mod presenter;

pub use normalize::{FieldHint, PointFilter, SeriesPoint, TabularNormalizer, DEFAULT_HINTS};
pub use presenter::{human_case, ChartKind, ChartView, QueryResult, ResultPresenter, ResultView, TableView};
