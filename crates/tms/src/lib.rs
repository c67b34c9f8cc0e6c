//! tms: test-management backend.
//!
//! Single dependency for embedders and tools. `core` carries the entities and
//! error surface, `server` the store, role gate and HTTP router.

pub mod core {
    pub use tms_core::*;
}

pub mod server {
    pub use tms_server::*;
}

/// Items most callers need to stand up or drive the service.
pub mod prelude {
    pub use tms_core::model::{
        NewProject, NewRequirement, NewTestCase, NewTestPlan, NewTestSuite, Project, RunRequest,
        RunResult, TestCase, TestPlan, TestReport, TestStatus, TestSuite, User,
    };
    pub use tms_core::{ClientCode, Role, TmsError};
    pub use tms_server::app_state::AppState;
    pub use tms_server::config::ServiceConfig;
    pub use tms_server::repo::Repository;
    pub use tms_server::router::build_router;
    pub use tms_server::store::Store;
}
