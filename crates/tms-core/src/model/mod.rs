//! Domain model shared by the server and its clients.

pub mod entity;
pub mod role;

pub use entity::{
    NewProject, NewRequirement, NewTestCase, NewTestPlan, NewTestReport, NewTestSuite, Project,
    Requirement, RunRequest, RunResult, TestCase, TestPlan, TestReport, TestStatus, TestSuite,
    Timestamp, User,
};
pub use role::Role;
