mod analytics_test;
mod courses_test;
mod feedbacks;
mod health_test;
mod students_test;
