use std::collections::BTreeSet;
use std::fmt::Display;

use askama::Template;
use log::debug;
use serde::Deserialize;

use crate::error::AppError;
use crate::models::{Category, Language, PunRequest, ServerResponse, SplitMode};

/// User-entered query and filters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub query: String,
    pub categories: BTreeSet<Category>,
    pub language: Option<Language>,
    pub include_nsfw: bool,
}

/// A single input event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    Query(String),
    Category(Category, bool),
    Language(Option<Language>),
    Nsfw(bool),
}

impl FormState {
    pub fn apply(&mut self, change: FieldChange) {
        match change {
            FieldChange::Query(query) => self.query = query,
            FieldChange::Category(category, true) => {
                self.categories.insert(category);
            }
            FieldChange::Category(category, false) => {
                self.categories.remove(&category);
            }
            FieldChange::Language(language) => self.language = language,
            FieldChange::Nsfw(include) => self.include_nsfw = include,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormPhase {
    #[default]
    Idle,
    Submitting,
}

/// The pun form: field state, submission phase, and the last output.
#[derive(Debug, Default)]
pub struct FormView {
    state: FormState,
    phase: FormPhase,
    output: String,
}

impl FormView {
    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn on_field_change(&mut self, change: FieldChange) {
        self.state.apply(change);
    }

    /// Package the current fields into a request and clear them.
    pub fn submit(&mut self) -> Result<PunRequest, AppError> {
        if self.phase == FormPhase::Submitting {
            return Err(AppError::AlreadySubmitting);
        }

        let state = std::mem::take(&mut self.state);
        self.phase = FormPhase::Submitting;

        Ok(PunRequest {
            input: state.query,
            categories: state.categories,
            language: state.language,
            include_nsfw: state.include_nsfw,
            mode: SplitMode::WordBlob,
        })
    }

    pub fn complete(&mut self, response: ServerResponse) {
        self.phase = FormPhase::Idle;
        self.output = response.output;
    }

    pub fn fail(&mut self, message: impl Display) {
        self.phase = FormPhase::Idle;
        self.output = format!("error: {}", message);
    }

    pub fn render(&self) -> Result<String, AppError> {
        let page = FormPage {
            query: &self.state.query,
            categories: Category::ALL
                .iter()
                .map(|&c| CategoryBox {
                    name: c.name(),
                    label: c.label(),
                    checked: self.state.categories.contains(&c),
                })
                .collect(),
            languages: Language::ALL
                .iter()
                .map(|&l| LanguageOption {
                    code: l.code(),
                    name: l.name(),
                    selected: self.state.language == Some(l),
                })
                .collect(),
            include_nsfw: self.state.include_nsfw,
            submitting: self.phase == FormPhase::Submitting,
            output: &self.output,
        };
        Ok(page.render()?)
    }
}

/// Fields posted by the HTML form. A checkbox is present only when checked.
#[derive(Debug, Default, Deserialize)]
pub struct FormFields {
    #[serde(default)]
    pub query: String,
    pub lyrics: Option<String>,
    pub phrases: Option<String>,
    pub urban: Option<String>,
    pub jokes: Option<String>,
    pub proverbs: Option<String>,
    pub quotes: Option<String>,
    pub language: Option<String>,
    pub nsfw: Option<String>,
}

impl FormFields {
    pub fn changes(&self) -> Vec<FieldChange> {
        let mut changes = vec![FieldChange::Query(self.query.clone())];

        let boxes = [
            (Category::Lyrics, &self.lyrics),
            (Category::Phrases, &self.phrases),
            (Category::Urban, &self.urban),
            (Category::Jokes, &self.jokes),
            (Category::Proverbs, &self.proverbs),
            (Category::Quotes, &self.quotes),
        ];
        for (category, field) in boxes {
            changes.push(FieldChange::Category(category, field.is_some()));
        }

        match self.language.as_deref().map(str::trim) {
            None | Some("") => changes.push(FieldChange::Language(None)),
            Some(code) => match code.parse() {
                Ok(language) => changes.push(FieldChange::Language(Some(language))),
                Err(e) => debug!("Ignoring language selection: {}", e),
            },
        }

        changes.push(FieldChange::Nsfw(self.nsfw.is_some()));
        changes
    }
}

struct CategoryBox {
    name: &'static str,
    label: &'static str,
    checked: bool,
}

struct LanguageOption {
    code: &'static str,
    name: &'static str,
    selected: bool,
}

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>PunGenT</title>
    <style>
      body { font-family: sans-serif; background: #f7fafc; margin: 0; }
      main { display: grid; grid-template-columns: 1fr 1fr; gap: 2rem; padding: 5rem; }
      section { border: 1px solid gray; border-radius: 6px; padding: 1.5rem; background: #f7fafc; }
      #output { height: 150px; overflow-y: scroll; border: 2px solid #e2e8f0; padding: 1rem; white-space: pre-wrap; }
      fieldset { border: none; padding: 0; }
    </style>
  </head>
  <body>
    <form method="post" action="/">
      <main>
        <section>
          <h1>PunGenT</h1>
          <p><small>Your one-stop-shop for wordplay!</small></p>
          <input type="text" name="query" placeholder="Your idea here!" value="{{ query }}" />
          <button type="submit"{% if submitting %} disabled{% endif %}>Generate</button>
          <pre id="output">{{ output }}</pre>
        </section>
        <section>
          <h2>Filters</h2>
          <fieldset>
            {% for category in categories %}
            <label><input type="checkbox" name="{{ category.name }}" value="on"{% if category.checked %} checked{% endif %} /> {{ category.label }}</label>
            {% endfor %}
          </fieldset>
          <hr />
          <select name="language">
            <option value="">Select Language</option>
            {% for language in languages %}
            <option value="{{ language.code }}"{% if language.selected %} selected{% endif %}>{{ language.name }}</option>
            {% endfor %}
          </select>
          <p><label><input type="checkbox" name="nsfw" value="on"{% if include_nsfw %} checked{% endif %} /> Include NSFW puns</label></p>
        </section>
      </main>
    </form>
  </body>
</html>
"#,
    ext = "html"
)]
struct FormPage<'a> {
    query: &'a str,
    categories: Vec<CategoryBox>,
    languages: Vec<LanguageOption>,
    include_nsfw: bool,
    submitting: bool,
    output: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_change_touches_only_query() {
        let mut state = FormState::default();
        state.apply(FieldChange::Category(Category::Jokes, true));
        state.apply(FieldChange::Language(Some(Language::French)));
        let before = state.clone();

        state.apply(FieldChange::Query("rye".into()));
        assert_eq!(state.query, "rye");
        assert_eq!(state.categories, before.categories);
        assert_eq!(state.language, before.language);
        assert_eq!(state.include_nsfw, before.include_nsfw);
    }

    #[test]
    fn test_category_toggle_touches_only_that_category() {
        let mut state = FormState::default();
        state.apply(FieldChange::Category(Category::Lyrics, true));
        state.apply(FieldChange::Category(Category::Quotes, true));
        state.apply(FieldChange::Category(Category::Lyrics, false));

        assert_eq!(state.categories, BTreeSet::from([Category::Quotes]));
        assert!(state.query.is_empty());
        assert_eq!(state.language, None);
    }

    #[test]
    fn test_language_selection() {
        let mut state = FormState::default();
        state.apply(FieldChange::Language(Some(Language::Spanish)));
        assert_eq!(state.language, Some(Language::Spanish));
        state.apply(FieldChange::Language(Some(Language::English)));
        assert_eq!(state.language, Some(Language::English));
    }

    #[test]
    fn test_submit_clears_all_fields() {
        let mut view = FormView::default();
        view.on_field_change(FieldChange::Query("rye".into()));
        view.on_field_change(FieldChange::Category(Category::Lyrics, true));
        view.on_field_change(FieldChange::Category(Category::Phrases, true));
        view.on_field_change(FieldChange::Language(Some(Language::French)));
        view.on_field_change(FieldChange::Nsfw(true));

        let request = view.submit().unwrap();
        assert_eq!(request.input, "rye");
        assert_eq!(request.categories.len(), 2);
        assert_eq!(request.language, Some(Language::French));
        assert!(request.include_nsfw);
        assert_eq!(request.mode, SplitMode::WordBlob);

        assert_eq!(view.state(), &FormState::default());
        assert_eq!(view.phase(), FormPhase::Submitting);
    }

    #[test]
    fn test_submit_while_submitting_is_rejected() {
        let mut view = FormView::default();
        view.submit().unwrap();
        assert!(matches!(view.submit(), Err(AppError::AlreadySubmitting)));

        view.complete(ServerResponse::default());
        assert_eq!(view.phase(), FormPhase::Idle);
        assert!(view.submit().is_ok());
    }

    #[test]
    fn test_render_before_response_has_empty_output() {
        let html = FormView::default().render().unwrap();
        assert!(html.contains(r#"<pre id="output"></pre>"#));
        assert!(html.contains(r#"value="""#));
    }

    #[test]
    fn test_render_shows_output_literally() {
        let mut view = FormView::default();
        view.submit().unwrap();
        view.complete(ServerResponse { output: "foo".into() });
        assert_eq!(view.output(), "foo");
        assert!(view.render().unwrap().contains(r#"<pre id="output">foo</pre>"#));

        view.complete(ServerResponse { output: "<b>pie</b>".into() });
        let html = view.render().unwrap();
        assert!(html.contains("&lt;b&gt;pie"));
        assert!(!html.contains("<b>pie"));
    }

    #[test]
    fn test_render_reflects_field_state() {
        let mut view = FormView::default();
        view.on_field_change(FieldChange::Category(Category::Urban, true));
        view.on_field_change(FieldChange::Language(Some(Language::Spanish)));
        let html = view.render().unwrap();

        assert!(html.contains(r#"name="urban" value="on" checked"#));
        assert!(html.contains(r#"name="lyrics" value="on" />"#));
        assert!(html.contains(r#"<option value="es" selected>Spanish</option>"#));
        assert!(html.contains("Anime Quotes"));
    }

    #[test]
    fn test_fail_renders_error_line() {
        let mut view = FormView::default();
        view.submit().unwrap();
        view.fail(AppError::EmptyQuery);
        assert_eq!(view.output(), "error: Query is empty");
        assert_eq!(view.phase(), FormPhase::Idle);
    }

    #[test]
    fn test_form_fields_to_changes() {
        let fields = FormFields {
            query: "rye".into(),
            lyrics: Some("on".into()),
            language: Some("fr".into()),
            nsfw: Some("on".into()),
            ..FormFields::default()
        };
        let mut state = FormState::default();
        for change in fields.changes() {
            state.apply(change);
        }

        assert_eq!(state.query, "rye");
        assert_eq!(state.categories, BTreeSet::from([Category::Lyrics]));
        assert_eq!(state.language, Some(Language::French));
        assert!(state.include_nsfw);
    }

    #[test]
    fn test_unknown_language_is_ignored() {
        let fields = FormFields {
            language: Some("klingon".into()),
            ..FormFields::default()
        };
        let mut state = FormState::default();
        state.apply(FieldChange::Language(Some(Language::Spanish)));
        for change in fields.changes() {
            state.apply(change);
        }
        assert_eq!(state.language, Some(Language::Spanish));
    }
}
