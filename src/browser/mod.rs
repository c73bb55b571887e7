// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Stateful browsing: sessions, pages, forms, tables, and links

mod config;
mod form;
mod history;
mod link;
mod page;
mod robots;
mod session;
mod table;

pub use config::{RetryPolicy, SessionOptions};
pub use form::{
    Enctype, Field, FieldKind, FieldOption, FieldValue, Form, FormMethod, FormSubmission,
};
pub use history::BrowserHistory;
pub use link::Link;
pub use page::Page;
pub use robots::RobotsTxt;
pub use session::Session;
pub use table::Table;
