// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! A fetched, parsed page
//!
//! A [`Page`] is an immutable snapshot of one response: URL, status,
//! headers, body, and the parsed document. It carries its session so
//! navigation chains: clicking a link or submitting a form yields a new
//! page from the same session.

use std::sync::Arc;

use bytes::Bytes;
use regex::Regex;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use url::Url;

use super::form::Form;
use super::link::{extract_links, Link};
use super::session::Session;
use super::table::Table;
use crate::dom::{parse_html, Document};
use crate::error::{Error, Result};
use crate::http::{Cookie, Response};

/// One fetched page
#[derive(Debug, Clone)]
pub struct Page {
    session: Session,
    url: Url,
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    document: Arc<Document>,
    links: Arc<Vec<Link>>,
    from_cache: bool,
}

impl Page {
    pub(crate) fn from_response(session: Session, response: Response) -> Self {
        let document = parse_html(&String::from_utf8_lossy(&response.body));
        let links = extract_links(&document, &response.url);
        Self {
            session,
            url: response.url,
            status: response.status,
            headers: response.headers,
            body: response.body,
            document: Arc::new(document),
            links: Arc::new(links),
            from_cache: response.from_cache,
        }
    }

    /// The final URL (after redirects)
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The response status
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The response status as u16
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The raw response body
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The body as text, lossy conversion
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// The parsed document
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The `<title>` text, if any
    pub fn title(&self) -> Option<String> {
        self.document.title()
    }

    /// Whether this page was served from the session cache
    pub fn from_cache(&self) -> bool {
        self.from_cache
    }

    /// The session this page belongs to
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Cookies currently applicable to this page's URL
    pub fn cookies(&self) -> Vec<Cookie> {
        self.session.cookie_jar().get_cookies(&self.url)
    }

    /// The first form on the page
    pub fn get_form(&self) -> Result<Form> {
        self.document
            .find("form")
            .map(Form::from_element)
            .ok_or(Error::MissingElement("form"))
    }

    /// All forms on the page, in document order
    pub fn get_forms(&self) -> Result<Vec<Form>> {
        let forms: Vec<Form> = self
            .document
            .find_all("form")
            .into_iter()
            .map(Form::from_element)
            .collect();
        if forms.is_empty() {
            return Err(Error::MissingElement("form"));
        }
        Ok(forms)
    }

    /// The form with the given id attribute
    pub fn get_form_by_id(&self, id: &str) -> Result<Form> {
        self.document
            .find_by_id(id)
            .filter(|e| e.name() == "form")
            .map(Form::from_element)
            .ok_or(Error::MissingElement("form"))
    }

    /// The first table on the page, reconstructed into a grid
    pub fn get_table(&self) -> Result<Table> {
        self.document
            .find("table")
            .map(Table::from_element)
            .ok_or(Error::MissingElement("table"))
    }

    /// All tables on the page, in document order
    pub fn get_tables(&self) -> Result<Vec<Table>> {
        let tables: Vec<Table> = self
            .document
            .find_all("table")
            .into_iter()
            .map(Table::from_element)
            .collect();
        if tables.is_empty() {
            return Err(Error::MissingElement("table"));
        }
        Ok(tables)
    }

    /// All links on the page, resolved and deduplicated
    pub fn get_links(&self) -> &[Link] {
        &self.links
    }

    /// Links whose text contains `text` (case-sensitive)
    pub fn get_links_by_text<'a>(
        &'a self,
        text: &'a str,
    ) -> impl Iterator<Item = &'a Link> + 'a {
        self.links.iter().filter(move |l| l.text.contains(text))
    }

    /// Links whose text matches the regex
    pub fn get_links_by_regex<'a>(
        &'a self,
        pattern: &'a Regex,
    ) -> impl Iterator<Item = &'a Link> + 'a {
        self.links.iter().filter(move |l| pattern.is_match(&l.text))
    }

    /// Follow a link, returning the new page
    ///
    /// The current page URL travels as the Referer header.
    pub async fn click_link(&self, link: &Link) -> Result<Page> {
        self.session
            .perform(
                reqwest::Method::GET,
                link.href.clone(),
                None,
                None,
                Some(&self.url),
            )
            .await
    }

    /// Follow the single link whose text equals `text`, ignoring case
    ///
    /// Zero matches or more than one match is an error.
    pub async fn click_link_by_text(&self, text: &str) -> Result<Page> {
        let wanted = text.trim().to_lowercase();
        let mut matches = self
            .links
            .iter()
            .filter(|l| l.text.trim().to_lowercase() == wanted);

        let link = match (matches.next(), matches.next()) {
            (Some(link), None) => link,
            (Some(_), Some(_)) => {
                return Err(Error::LinkNotFound {
                    text: text.to_string(),
                    reason: "more than one link matches".to_string(),
                })
            }
            (None, _) => {
                return Err(Error::LinkNotFound {
                    text: text.to_string(),
                    reason: "no link matches".to_string(),
                })
            }
        };
        self.click_link(link).await
    }

    /// Submit a form as-is, returning the result page
    pub async fn submit_form(&self, form: &Form) -> Result<Page> {
        self.submit_form_with(form, None, &[]).await
    }

    /// Submit a form, electing a submit button and appending extra values
    pub async fn submit_form_with(
        &self,
        form: &Form,
        submit_button: Option<&str>,
        extra: &[(&str, &str)],
    ) -> Result<Page> {
        let submission = form.prepare(&self.url, submit_button, extra)?;
        self.session
            .perform(
                submission.method,
                submission.url,
                submission.body,
                submission.content_type,
                Some(&self.url),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderMap;

    fn page(html: &str) -> Page {
        let session = Session::new().unwrap();
        let response = Response::new(
            StatusCode::OK,
            HeaderMap::new(),
            Bytes::from(html.to_string()),
            Url::parse("https://example.com/start").unwrap(),
            false,
            10,
        );
        Page::from_response(session, response)
    }

    #[test]
    fn test_title_and_text() {
        let page = page("<html><head><title>Hello</title></head><body>hi</body></html>");
        assert_eq!(page.title().as_deref(), Some("Hello"));
        assert!(page.text().contains("hi"));
        assert!(page.is_success());
        assert!(!page.from_cache());
    }

    #[test]
    fn test_get_form_missing() {
        let page = page("<p>no forms here</p>");
        assert!(matches!(
            page.get_form().unwrap_err(),
            Error::MissingElement("form")
        ));
        assert!(page.get_forms().is_err());
    }

    #[test]
    fn test_get_form_by_id() {
        let page = page(
            r#"<form id="first"><input name="a"></form>
               <form id="second"><input name="b"></form>"#,
        );
        let form = page.get_form_by_id("second").unwrap();
        assert!(form.field("b").is_some());
        assert!(page.get_form_by_id("third").is_err());
        assert_eq!(page.get_forms().unwrap().len(), 2);
    }

    #[test]
    fn test_get_form_by_id_ignores_non_forms() {
        let page = page(r#"<div id="x"></div>"#);
        assert!(page.get_form_by_id("x").is_err());
    }

    #[test]
    fn test_get_tables() {
        let page = page("<table><tr><td>1</td></tr></table>");
        let table = page.get_table().unwrap();
        assert_eq!(table.rows(), &[vec!["1".to_string()]]);
    }

    #[test]
    fn test_links_by_text_is_case_sensitive_containment() {
        let page = page(
            r#"<a href="/a">Download Python</a>
               <a href="/b">python docs</a>"#,
        );
        let hits: Vec<_> = page.get_links_by_text("Python").collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].href.path(), "/a");
    }

    #[test]
    fn test_links_by_regex() {
        let page = page(
            r#"<a href="/a">release 1.2</a>
               <a href="/b">about</a>"#,
        );
        let re = Regex::new(r"release \d+\.\d+").unwrap();
        let hits: Vec<_> = page.get_links_by_regex(&re).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].href.path(), "/a");
    }

    #[tokio::test]
    async fn test_click_link_by_text_requires_unique_match() {
        let page = page(
            r#"<a href="/a">Next</a>
               <a href="/b">next</a>
               <a href="/c">other</a>"#,
        );
        // Case-insensitive equality matches both
        let err = page.click_link_by_text("NEXT").await.unwrap_err();
        assert!(matches!(err, Error::LinkNotFound { .. }));

        let err = page.click_link_by_text("missing").await.unwrap_err();
        assert!(matches!(err, Error::LinkNotFound { .. }));
    }
}
