//! Latest Guardian headlines for one section. Needs a free Guardian API key.

use crate::adapters::http::HttpRequest;
use crate::config::host::Invoker;
use crate::config::settings::SettingDefinition;
use crate::core::context::PluginContext;
use crate::core::menu::Menu;
use crate::core::params::Params;
use crate::domain::ports::{CommandRunner, Plugin};
use crate::plugins::debug_setting;
use crate::utils::error::{PluginError, Result};
use crate::utils::time::prettify_timestamp;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

const API_KEY: &str = "VAR_HEADLINES_API_KEY";
const DEBUG_ENABLED: &str = "VAR_HEADLINES_DEBUG_ENABLED";
const LIMIT: &str = "VAR_HEADLINES_LIMIT";
const SECTION: &str = "VAR_HEADLINES_SECTION";

const PUBLISHED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const MAX_TITLE_LENGTH: i64 = 125;

pub const GUARDIAN_URL: &str = "https://content.guardianapis.com";

const COMMON_SECTIONS: [&str; 12] = [
    "business",
    "culture",
    "environment",
    "football",
    "lifeandstyle",
    "politics",
    "science",
    "sport",
    "technology",
    "uk-news",
    "us-news",
    "world",
];

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    response: ResultsPage<T>,
}

#[derive(Debug, Deserialize)]
struct ResultsPage<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct Section {
    id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub section_name: String,
    pub web_publication_date: String,
    pub web_title: String,
    pub web_url: String,
}

impl Article {
    /// Publication time padded to a fixed column, then the title. `|` would
    /// start the markup parameters, so it is replaced.
    pub fn menu_text(&self) -> String {
        format!(
            "{:<22}{}",
            prettify_timestamp(&self.web_publication_date, PUBLISHED_FORMAT),
            self.web_title.replace('|', "-")
        )
    }
}

#[derive(Debug)]
pub struct Headlines {
    base_url: String,
}

impl Default for Headlines {
    fn default() -> Self {
        Self::new()
    }
}

impl Headlines {
    pub fn new() -> Self {
        Self::with_base_url(GUARDIAN_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Section ids the key has access to, minus the `about` pseudo section.
    async fn sections(&self, ctx: &PluginContext, api_key: &str) -> Result<Vec<String>> {
        let request = HttpRequest::get(format!("{}/sections", self.base_url))
            .query("api-key", api_key)
            .encode_query(true);
        let page: Envelope<Section> = ctx.http.get_json(&request).await?;
        Ok(page
            .response
            .results
            .into_iter()
            .map(|section| section.id)
            .filter(|id| id != "about")
            .collect())
    }
}

#[async_trait]
impl Plugin for Headlines {
    type Data = Vec<Article>;

    fn name(&self) -> &str {
        "Headlines"
    }

    fn failure_title(&self) -> String {
        "Headlines: Error".to_string()
    }

    fn settings(&self, _runner: &dyn CommandRunner) -> Vec<SettingDefinition> {
        let limits = (5..=50).step_by(5).map(Value::from).collect();
        let sections = COMMON_SECTIONS.iter().map(|s| Value::from(*s)).collect();
        vec![
            debug_setting(DEBUG_ENABLED),
            SettingDefinition::new(LIMIT, 30)
                .range(5.0, 50.0)
                .choice_with("limit", "Limit", limits),
            SettingDefinition::new(API_KEY, ""),
            SettingDefinition::new(SECTION, "world").choice_with("section", "Section", sections),
        ]
    }

    fn debug_setting(&self) -> Option<&str> {
        Some(DEBUG_ENABLED)
    }

    async fn collect(&self, ctx: &PluginContext) -> Result<Vec<Article>> {
        let api_key = ctx.settings.get_str(API_KEY);
        if api_key.trim().is_empty() {
            return Err(PluginError::MissingConfigError {
                field: API_KEY.to_string(),
            });
        }

        let section = ctx.settings.get_str(SECTION);
        let sections = self.sections(ctx, &api_key).await?;
        if sections.is_empty() {
            return Err(PluginError::parse("Guardian sections", "the section list is empty"));
        }
        if !sections.contains(&section) {
            return Err(PluginError::InvalidConfigValueError {
                field: SECTION.to_string(),
                value: section,
                reason: format!("Valid sections: {}", sections.join(", ")),
            });
        }

        let request = HttpRequest::get(format!("{}/search", self.base_url))
            .query("section", &section)
            .query("api-key", &api_key)
            .query("page-size", ctx.settings.get_i64(LIMIT))
            .query("format", "json")
            .encode_query(true);
        let page: Envelope<Article> = ctx.http.get_json(&request).await?;
        tracing::debug!("{} headlines in {}", page.response.results.len(), section);
        Ok(page.response.results)
    }

    fn render(&self, articles: Vec<Article>, ctx: &PluginContext, menu: &mut Menu) -> Result<()> {
        let Some(first) = articles.first() else {
            menu.title("Headlines: 0", Params::new());
            return Ok(());
        };
        menu.title(
            &format!("Headlines: {} in {}", articles.len(), first.section_name),
            Params::new(),
        );
        let color = if ctx.host.invoker == Invoker::Xbar { "blue" } else { "black" };
        for article in &articles {
            menu.item(
                &article.menu_text(),
                Params::new()
                    .color(color)
                    .length(MAX_TITLE_LENGTH)
                    .href(&article.web_url)
                    .sfimage("link")
                    .sfsize(8)
                    .trim(false),
            );
        }
        Ok(())
    }
}
