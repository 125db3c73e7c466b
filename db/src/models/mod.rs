pub mod course;
pub mod enrollment;
pub mod feedback;
pub mod instructor;
pub mod submission_quota;
pub mod user;

pub use course::Entity as Course;
pub use enrollment::Entity as Enrollment;
pub use feedback::Entity as Feedback;
pub use instructor::Entity as Instructor;
pub use submission_quota::Entity as SubmissionQuota;
pub use user::Entity as User;
