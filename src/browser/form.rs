// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Form discovery, manipulation, and submission payloads
//!
//! A [`Form`] is an owned, mutable snapshot of a `<form>` element. Field
//! kinds are classified once at discovery and never re-inferred; setters
//! enforce the kind they apply to. Submission is a pure function from the
//! snapshot to a [`FormSubmission`] the session can send.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use reqwest::Method;
use url::{form_urlencoded, Url};

use crate::dom::Element;
use crate::error::{Error, Result};

/// Form submission method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormMethod {
    /// Values travel in the URL query string
    #[default]
    Get,
    /// Values travel in the request body
    Post,
}

impl FormMethod {
    // Absent or unrecognized methods default to GET, like browsers do
    fn from_attr(attr: Option<&str>) -> Self {
        match attr.map(str::to_ascii_lowercase).as_deref() {
            Some("post") => FormMethod::Post,
            _ => FormMethod::Get,
        }
    }

    /// The corresponding HTTP method
    pub fn as_method(&self) -> Method {
        match self {
            FormMethod::Get => Method::GET,
            FormMethod::Post => Method::POST,
        }
    }
}

/// Form encoding type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Enctype {
    /// application/x-www-form-urlencoded
    #[default]
    UrlEncoded,
    /// multipart/form-data
    Multipart,
}

impl Enctype {
    fn from_attr(attr: Option<&str>) -> Self {
        match attr.map(str::to_ascii_lowercase).as_deref() {
            Some("multipart/form-data") => Enctype::Multipart,
            _ => Enctype::UrlEncoded,
        }
    }
}

/// Field classification, assigned once at discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Text-like input (text, email, password, number, ...)
    Text,
    /// `<textarea>`
    Textarea,
    /// Hidden input
    Hidden,
    /// Checkbox group (all inputs sharing the name)
    Checkbox,
    /// Radio group (all inputs sharing the name)
    Radio,
    /// `<select>`
    Select,
    /// Submit button
    Submit,
    /// File upload input
    File,
}

impl FieldKind {
    /// Human-readable kind name, used in error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Textarea => "textarea",
            FieldKind::Hidden => "hidden",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Radio => "radio",
            FieldKind::Select => "select",
            FieldKind::Submit => "submit",
            FieldKind::File => "file",
        }
    }

    fn is_text_like(&self) -> bool {
        matches!(
            self,
            FieldKind::Text | FieldKind::Textarea | FieldKind::Hidden
        )
    }
}

/// One selectable option of a select/checkbox/radio field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOption {
    /// Visible label (option text, or the label element's text)
    pub label: String,
    /// Submitted value
    pub value: String,
}

/// Current value of a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// No value (empty text input, nothing checked)
    None,
    /// Single value
    Single(String),
    /// Set of values (checkbox group, multiple select)
    Many(Vec<String>),
    /// File paths queued for upload
    Files(Vec<PathBuf>),
}

/// One form control and its current value
#[derive(Debug, Clone)]
pub struct Field {
    /// Field name from the markup
    pub name: String,
    /// Field classification
    pub kind: FieldKind,
    /// Current value
    pub value: FieldValue,
    /// Known options (select/checkbox/radio)
    pub options: Vec<FieldOption>,
    /// Disabled fields never serialize
    pub disabled: bool,
    /// Whether the field accepts multiple values
    pub multiple: bool,
}

impl Field {
    fn matches_option(&self, wanted: &str) -> Option<&FieldOption> {
        self.options
            .iter()
            .find(|o| o.value == wanted || o.label == wanted)
    }
}

/// A mutable snapshot of one `<form>` element
#[derive(Debug, Clone)]
pub struct Form {
    /// Form id attribute
    pub id: Option<String>,
    /// Form name attribute
    pub name: Option<String>,
    action: Option<String>,
    method: FormMethod,
    enctype: Enctype,
    fields: Vec<Field>,
}

impl Form {
    /// Build a form snapshot from a `<form>` element
    pub(crate) fn from_element(form: Element<'_>) -> Self {
        let labels: HashMap<String, String> = form
            .find_all("label")
            .into_iter()
            .filter_map(|l| {
                l.attr("for")
                    .map(|f| (f.to_string(), l.text().trim().to_string()))
            })
            .collect();

        let mut fields: Vec<Field> = Vec::new();

        for control in form.find_all_any(&["input", "select", "textarea", "button"]) {
            let Some(name) = control.attr("name").filter(|n| !n.is_empty()) else {
                continue;
            };
            let name = name.to_string();
            let disabled = control.has_attr("disabled");

            match control.name() {
                "textarea" => {
                    let text = control.text();
                    let text = text.trim_end_matches(['\r', '\n']);
                    fields.push(Field {
                        name,
                        kind: FieldKind::Textarea,
                        value: FieldValue::Single(text.to_string()),
                        options: Vec::new(),
                        disabled,
                        multiple: false,
                    });
                }
                "select" => {
                    let multiple = control.has_attr("multiple");
                    let mut options = Vec::new();
                    let mut selected = Vec::new();
                    for opt in control.find_all("option") {
                        let label = opt.text().trim().to_string();
                        let value = opt
                            .attr("value")
                            .map(str::to_string)
                            .unwrap_or_else(|| label.clone());
                        if opt.has_attr("selected") {
                            selected.push(value.clone());
                        }
                        options.push(FieldOption { label, value });
                    }
                    // A single select with nothing marked shows (and
                    // submits) its first option
                    if selected.is_empty() && !multiple {
                        if let Some(first) = options.first() {
                            selected.push(first.value.clone());
                        }
                    }
                    let value = if multiple {
                        FieldValue::Many(selected)
                    } else {
                        match selected.into_iter().next() {
                            Some(v) => FieldValue::Single(v),
                            None => FieldValue::None,
                        }
                    };
                    fields.push(Field {
                        name,
                        kind: FieldKind::Select,
                        value,
                        options,
                        disabled,
                        multiple,
                    });
                }
                tag @ ("input" | "button") => {
                    let default_type = if tag == "button" { "submit" } else { "text" };
                    let input_type = control
                        .attr("type")
                        .unwrap_or(default_type)
                        .to_ascii_lowercase();
                    match input_type.as_str() {
                        "checkbox" | "radio" => {
                            group_checkable(
                                &mut fields,
                                &control,
                                &labels,
                                name,
                                &input_type,
                                disabled,
                            );
                        }
                        "submit" | "image" => {
                            let value = control
                                .attr("value")
                                .map(|v| FieldValue::Single(v.to_string()))
                                .unwrap_or(FieldValue::None);
                            fields.push(Field {
                                name,
                                kind: FieldKind::Submit,
                                value,
                                options: Vec::new(),
                                disabled,
                                multiple: false,
                            });
                        }
                        "file" => {
                            fields.push(Field {
                                name,
                                kind: FieldKind::File,
                                value: FieldValue::Files(Vec::new()),
                                options: Vec::new(),
                                disabled,
                                multiple: control.has_attr("multiple"),
                            });
                        }
                        // Plain buttons and reset controls never submit
                        "button" | "reset" => {}
                        "hidden" => {
                            let value = control
                                .attr("value")
                                .map(|v| FieldValue::Single(v.to_string()))
                                .unwrap_or(FieldValue::None);
                            fields.push(Field {
                                name,
                                kind: FieldKind::Hidden,
                                value,
                                options: Vec::new(),
                                disabled,
                                multiple: false,
                            });
                        }
                        _ => {
                            let value = control
                                .attr("value")
                                .map(|v| FieldValue::Single(v.to_string()))
                                .unwrap_or(FieldValue::None);
                            fields.push(Field {
                                name,
                                kind: FieldKind::Text,
                                value,
                                options: Vec::new(),
                                disabled,
                                multiple: false,
                            });
                        }
                    }
                }
                _ => {}
            }
        }

        Self {
            id: form.attr("id").map(str::to_string),
            name: form.attr("name").map(str::to_string),
            action: form.attr("action").map(str::to_string),
            method: FormMethod::from_attr(form.attr("method")),
            enctype: Enctype::from_attr(form.attr("enctype")),
            fields,
        }
    }

    /// The raw action attribute, if present
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    /// The submission method
    pub fn method(&self) -> FormMethod {
        self.method
    }

    /// The declared encoding type
    pub fn enctype(&self) -> Enctype {
        self.enctype
    }

    /// All fields in declaration order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn field_mut(&mut self, name: &str) -> Result<&mut Field> {
        self.fields
            .iter_mut()
            .find(|f| f.name == name)
            .ok_or_else(|| Error::field_not_found(name))
    }

    /// Set the value of a text-like field (text, textarea, hidden)
    pub fn fill_in(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let field = self.field_mut(name)?;
        if !field.kind.is_text_like() {
            return Err(Error::invalid_field_type(
                name,
                "text",
                field.kind.as_str(),
            ));
        }
        field.value = FieldValue::Single(value.into());
        Ok(())
    }

    /// Check checkbox values or pick a radio option
    ///
    /// Each value must match an option's value or label; nothing is
    /// mutated when any value is unknown.
    pub fn check(&mut self, name: &str, values: &[&str]) -> Result<()> {
        let field = self.field_mut(name)?;
        match field.kind {
            FieldKind::Checkbox => {
                let mut matched = Vec::with_capacity(values.len());
                for value in values {
                    match field.matches_option(value) {
                        Some(opt) => matched.push(opt.value.clone()),
                        None => return Err(Error::invalid_option(name, *value)),
                    }
                }
                let mut checked = match &field.value {
                    FieldValue::Many(v) => v.clone(),
                    _ => Vec::new(),
                };
                for value in matched {
                    if !checked.contains(&value) {
                        checked.push(value);
                    }
                }
                field.value = FieldValue::Many(checked);
                Ok(())
            }
            FieldKind::Radio => {
                // A radio group holds exactly one value; the last match wins
                let mut chosen = None;
                for value in values {
                    match field.matches_option(value) {
                        Some(opt) => chosen = Some(opt.value.clone()),
                        None => return Err(Error::invalid_option(name, *value)),
                    }
                }
                if let Some(value) = chosen {
                    field.value = FieldValue::Single(value);
                }
                Ok(())
            }
            other => Err(Error::invalid_field_type(
                name,
                "checkbox or radio",
                other.as_str(),
            )),
        }
    }

    /// Uncheck checkbox values, or clear a radio selection if it matches
    pub fn uncheck(&mut self, name: &str, values: &[&str]) -> Result<()> {
        let field = self.field_mut(name)?;
        match field.kind {
            FieldKind::Checkbox => {
                let mut matched = Vec::with_capacity(values.len());
                for value in values {
                    match field.matches_option(value) {
                        Some(opt) => matched.push(opt.value.clone()),
                        None => return Err(Error::invalid_option(name, *value)),
                    }
                }
                if let FieldValue::Many(checked) = &mut field.value {
                    checked.retain(|v| !matched.contains(v));
                }
                Ok(())
            }
            FieldKind::Radio => {
                let mut matched = Vec::with_capacity(values.len());
                for value in values {
                    match field.matches_option(value) {
                        Some(opt) => matched.push(opt.value.clone()),
                        None => return Err(Error::invalid_option(name, *value)),
                    }
                }
                if let FieldValue::Single(current) = &field.value {
                    if matched.iter().any(|v| v == current) {
                        field.value = FieldValue::None;
                    }
                }
                Ok(())
            }
            other => Err(Error::invalid_field_type(
                name,
                "checkbox or radio",
                other.as_str(),
            )),
        }
    }

    /// Choose one option of a select field, by value or label
    pub fn choose(&mut self, name: &str, option: &str) -> Result<()> {
        let field = self.field_mut(name)?;
        if field.kind != FieldKind::Select {
            return Err(Error::invalid_field_type(
                name,
                "select",
                field.kind.as_str(),
            ));
        }
        let value = field
            .matches_option(option)
            .map(|o| o.value.clone())
            .ok_or_else(|| Error::invalid_option(name, option))?;
        field.value = if field.multiple {
            FieldValue::Many(vec![value])
        } else {
            FieldValue::Single(value)
        };
        Ok(())
    }

    /// Choose several options of a `multiple` select field
    pub fn select_multi(&mut self, name: &str, options: &[&str]) -> Result<()> {
        let field = self.field_mut(name)?;
        if field.kind != FieldKind::Select {
            return Err(Error::invalid_field_type(
                name,
                "select",
                field.kind.as_str(),
            ));
        }
        if !field.multiple && options.len() > 1 {
            return Err(Error::invalid_field_type(
                name,
                "multiple select",
                "single select",
            ));
        }
        let mut values = Vec::with_capacity(options.len());
        for option in options {
            match field.matches_option(option) {
                Some(opt) => values.push(opt.value.clone()),
                None => return Err(Error::invalid_option(name, *option)),
            }
        }
        field.value = if field.multiple {
            FieldValue::Many(values)
        } else {
            match values.into_iter().next() {
                Some(v) => FieldValue::Single(v),
                None => FieldValue::None,
            }
        };
        Ok(())
    }

    /// Queue a file for a file field
    pub fn upload(&mut self, name: &str, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        let field = self.field_mut(name)?;
        if field.kind != FieldKind::File {
            return Err(Error::invalid_field_type(
                name,
                "file",
                field.kind.as_str(),
            ));
        }
        match &mut field.value {
            FieldValue::Files(paths) => {
                if !field.multiple {
                    paths.clear();
                }
                paths.push(path);
            }
            _ => field.value = FieldValue::Files(vec![path]),
        }
        Ok(())
    }

    /// Check whether any field carries a queued file
    pub fn has_files(&self) -> bool {
        self.fields.iter().any(|f| {
            matches!(&f.value, FieldValue::Files(paths) if !paths.is_empty()) && !f.disabled
        })
    }

    /// Resolve the submission target, method, and encoded payload
    ///
    /// Pure with respect to the form: the snapshot is read, never
    /// mutated. `submit_button` elects one submit control by name or
    /// value; without it the first named submit control contributes.
    /// `extra` pairs are appended after the fields.
    pub fn prepare(
        &self,
        base: &Url,
        submit_button: Option<&str>,
        extra: &[(&str, &str)],
    ) -> Result<FormSubmission> {
        let url = self.resolve_action(base)?;
        let chosen_submit = self.elect_submit(submit_button)?;

        let mut pairs: Vec<(String, String)> = Vec::new();
        let mut files: Vec<(String, PathBuf)> = Vec::new();

        for (index, field) in self.fields.iter().enumerate() {
            if field.disabled {
                continue;
            }
            match field.kind {
                FieldKind::Text | FieldKind::Hidden | FieldKind::Textarea => {
                    let value = match &field.value {
                        FieldValue::Single(v) => v.clone(),
                        _ => String::new(),
                    };
                    pairs.push((field.name.clone(), value));
                }
                FieldKind::Radio => {
                    if let FieldValue::Single(v) = &field.value {
                        pairs.push((field.name.clone(), v.clone()));
                    }
                }
                FieldKind::Checkbox => {
                    if let FieldValue::Many(checked) = &field.value {
                        // Emit in option-declaration order
                        for option in &field.options {
                            if checked.contains(&option.value) {
                                pairs.push((field.name.clone(), option.value.clone()));
                            }
                        }
                    }
                }
                FieldKind::Select => match &field.value {
                    FieldValue::Single(v) => pairs.push((field.name.clone(), v.clone())),
                    FieldValue::Many(selected) => {
                        for option in &field.options {
                            if selected.contains(&option.value) {
                                pairs.push((field.name.clone(), option.value.clone()));
                            }
                        }
                    }
                    _ => {}
                },
                FieldKind::Submit => {
                    if chosen_submit == Some(index) {
                        let value = match &field.value {
                            FieldValue::Single(v) => v.clone(),
                            _ => String::new(),
                        };
                        pairs.push((field.name.clone(), value));
                    }
                }
                FieldKind::File => {
                    if let FieldValue::Files(paths) = &field.value {
                        for path in paths {
                            files.push((field.name.clone(), path.clone()));
                        }
                    }
                }
            }
        }

        for (name, value) in extra {
            pairs.push((name.to_string(), value.to_string()));
        }

        self.encode(url, pairs, files)
    }

    fn resolve_action(&self, base: &Url) -> Result<Url> {
        match self.action.as_deref() {
            Some(action) if !action.is_empty() => base
                .join(action)
                .map_err(|e| Error::invalid_form_action(action, e.to_string())),
            _ => Ok(base.clone()),
        }
    }

    // Returns the field index of the submit control that contributes its
    // name/value pair, if any.
    fn elect_submit(&self, submit_button: Option<&str>) -> Result<Option<usize>> {
        let submits = self
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.kind == FieldKind::Submit && !f.disabled);

        match submit_button {
            Some(wanted) => {
                for (index, field) in submits {
                    let value_matches = matches!(&field.value,
                        FieldValue::Single(v) if v == wanted);
                    if field.name == wanted || value_matches {
                        return Ok(Some(index));
                    }
                }
                Err(Error::field_not_found(wanted))
            }
            None => Ok(submits.map(|(index, _)| index).next()),
        }
    }

    fn encode(
        &self,
        mut url: Url,
        pairs: Vec<(String, String)>,
        files: Vec<(String, PathBuf)>,
    ) -> Result<FormSubmission> {
        match self.method {
            FormMethod::Get => {
                // GET submission replaces any query the action carried
                url.set_query(None);
                if !pairs.is_empty() || !files.is_empty() {
                    let mut serializer = url.query_pairs_mut();
                    for (name, value) in &pairs {
                        serializer.append_pair(name, value);
                    }
                    // File inputs submit their file name on GET forms
                    for (name, path) in &files {
                        serializer.append_pair(name, &file_name(path));
                    }
                }
                Ok(FormSubmission {
                    method: Method::GET,
                    url,
                    body: None,
                    content_type: None,
                })
            }
            FormMethod::Post => {
                if self.enctype == Enctype::Multipart || !files.is_empty() {
                    let boundary = multipart_boundary();
                    let body = encode_multipart(&boundary, &pairs, &files)?;
                    Ok(FormSubmission {
                        method: Method::POST,
                        url,
                        body: Some(body),
                        content_type: Some(format!(
                            "multipart/form-data; boundary={}",
                            boundary
                        )),
                    })
                } else {
                    let mut serializer = form_urlencoded::Serializer::new(String::new());
                    for (name, value) in &pairs {
                        serializer.append_pair(name, value);
                    }
                    Ok(FormSubmission {
                        method: Method::POST,
                        url,
                        body: Some(Bytes::from(serializer.finish())),
                        content_type: Some(
                            "application/x-www-form-urlencoded".to_string(),
                        ),
                    })
                }
            }
        }
    }
}

/// A fully resolved, encoded form submission
#[derive(Debug, Clone)]
pub struct FormSubmission {
    /// HTTP method to use
    pub method: Method,
    /// Resolved absolute target URL (query included for GET)
    pub url: Url,
    /// Encoded request body, if any
    pub body: Option<Bytes>,
    /// Content type matching the body encoding
    pub content_type: Option<String>,
}

fn group_checkable(
    fields: &mut Vec<Field>,
    control: &Element<'_>,
    labels: &HashMap<String, String>,
    name: String,
    input_type: &str,
    disabled: bool,
) {
    let kind = if input_type == "checkbox" {
        FieldKind::Checkbox
    } else {
        FieldKind::Radio
    };
    let value = control.attr("value").unwrap_or("on").to_string();
    let label = control
        .attr("id")
        .and_then(|id| labels.get(id).cloned())
        .unwrap_or_else(|| value.clone());
    let checked = control.has_attr("checked");
    let option = FieldOption { label, value };

    if let Some(field) = fields
        .iter_mut()
        .find(|f| f.name == name && f.kind == kind)
    {
        if checked {
            match kind {
                FieldKind::Checkbox => {
                    if let FieldValue::Many(values) = &mut field.value {
                        if !values.contains(&option.value) {
                            values.push(option.value.clone());
                        }
                    }
                }
                _ => field.value = FieldValue::Single(option.value.clone()),
            }
        }
        field.disabled = field.disabled && disabled;
        field.options.push(option);
        return;
    }

    let value = match (kind, checked) {
        (FieldKind::Checkbox, true) => FieldValue::Many(vec![option.value.clone()]),
        (FieldKind::Checkbox, false) => FieldValue::Many(Vec::new()),
        (_, true) => FieldValue::Single(option.value.clone()),
        (_, false) => FieldValue::None,
    };
    fields.push(Field {
        name,
        kind,
        value,
        options: vec![option],
        disabled,
        multiple: kind == FieldKind::Checkbox,
    });
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn multipart_boundary() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    format!("----mustekala-{:x}", nanos)
}

fn encode_multipart(
    boundary: &str,
    pairs: &[(String, String)],
    files: &[(String, PathBuf)],
) -> Result<Bytes> {
    let mut body = Vec::new();

    for (name, value) in pairs {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    for (name, path) in files {
        let contents = std::fs::read(path)?;
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                name,
                file_name(path)
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(&contents);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    Ok(Bytes::from(body))
}
