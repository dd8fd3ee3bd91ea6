//! Search orchestration: validation, planning, provider fetches, and ranking.
//!
//! The pipeline talks to its collaborators through the narrow traits in
//! [`traits`], so the whole flow can run against in-memory fakes.

pub mod error;
pub mod live;
pub mod search;
pub mod traits;
pub mod validate;

pub use error::{ClientBuildError, PipelineError, ValidationError};
pub use live::{build_live_pipeline, LivePlaceSearch};
pub use search::{PlaceSearch, RankedSearch, SearchSummary};
pub use traits::{FetchDirectory, FetchLocal, PlanQuery, RankPlaces, ReverseGeocode};
pub use validate::{validate_request, SearchRequest, ValidatedRequest};
