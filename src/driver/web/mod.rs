mod driver;

pub use driver::{WebSession, WebSessionFactory};
