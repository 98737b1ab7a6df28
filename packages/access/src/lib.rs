// ABOUTME: Role-scoped read access for requirements, submissions, and meetings
// ABOUTME: Resolves each caller to a visibility scope and enriches results with display names

pub mod caller;
pub mod enrich;
pub mod resolver;
pub mod scope;

pub use caller::Caller;
pub use enrich::{EnrichedMeeting, EnrichedRequirement, EnrichedSubmission};
pub use resolver::VisibilityResolver;
pub use scope::{MeetingQuery, RequirementQuery, SubmissionQuery, VisibilityScope};
