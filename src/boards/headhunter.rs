use super::{contact_from_json, deserialize_id, HOME_COUNTRY};
use crate::catalog::{Country, Region, RoleGroup, Taxonomy, TaxonomyEntry};
use crate::config::ParserSettings;
use crate::core::retry::RetryConfig;
use crate::core::{BoardSession, JobBoard, PageQuery};
use crate::http::{HttpRequest, HttpResponse};
use crate::models::{ContactInfo, Continuation, SearchPage, VacancyId, VacancyRecord};
use crate::parser::{extract_build_version, extract_json_by_id, EMBEDDED_STATE_ID};
use crate::scrapers::Scraper;
use crate::{ScoutError, ScoutResult};
use async_trait::async_trait;
use log::{debug, info};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use url::Url;

const PAGE_SIZE: usize = 100;
const STALE_VERSION_STATUS: u16 = 406;

/// Shape of the top level of `areaTree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AreaLayout {
    /// Countries first (hh.ru); only the home country is kept.
    Countries,
    /// Regions of the home country directly (zarplata.ru).
    Regions,
}

/// hh.ru and its sister site zarplata.ru: same frontend, same endpoints.
#[derive(Debug, Clone)]
pub struct HhFamilyBoard {
    name: &'static str,
    state_stem: &'static str,
    base_url: Url,
    layout: AreaLayout,
    headers: BTreeMap<String, String>,
    deliver_without_contacts: bool,
}

#[derive(Debug, Deserialize)]
struct AreaNode {
    #[serde(deserialize_with = "deserialize_id")]
    id: String,
    text: String,
    #[serde(default)]
    items: Vec<AreaNode>,
}

#[derive(Debug, Default, Deserialize)]
struct RoleTree {
    #[serde(default)]
    items: Vec<RoleNode>,
}

#[derive(Debug, Deserialize)]
struct RoleNode {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    items: Vec<AreaNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdvancedSearchState {
    #[serde(default)]
    area_tree: Vec<AreaNode>,
    #[serde(default)]
    professional_role_tree: RoleTree,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchEnvelope {
    vacancy_search_result: SearchResult,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    vacancies: Vec<HhVacancy>,
    #[serde(default)]
    paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
struct Paging {
    #[serde(default)]
    next: Option<PageRef>,
}

#[derive(Debug, Deserialize)]
struct PageRef {
    page: usize,
}

#[derive(Debug, Default, Deserialize)]
struct Named {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Company {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Links {
    #[serde(default)]
    desktop: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HhVacancy {
    #[serde(rename = "vacancyId")]
    vacancy_id: u64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    company: Company,
    #[serde(default)]
    area: Named,
    #[serde(default)]
    links: Links,
    #[serde(rename = "@showContact", default)]
    show_contact: bool,
    #[serde(rename = "@isAdv", default, deserialize_with = "deserialize_present")]
    is_adv: bool,
    #[serde(rename = "creationSite", default)]
    creation_site: Option<String>,
}

/// True whenever the key is there, whatever it holds.
fn deserialize_present<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    serde::de::IgnoredAny::deserialize(deserializer)?;
    Ok(true)
}

impl From<HhVacancy> for VacancyRecord {
    fn from(vacancy: HhVacancy) -> Self {
        let employer_id = vacancy.company.id.as_ref().and_then(super::id_text);
        VacancyRecord {
            id: VacancyId::Numeric(vacancy.vacancy_id),
            title: vacancy.name,
            company_name: vacancy.company.name,
            city_name: vacancy.area.name,
            url: vacancy.links.desktop,
            contact_flag: vacancy.show_contact && employer_id.is_some(),
            employer_id,
            is_advertisement: vacancy.is_adv,
            creation_site: vacancy.creation_site,
            inline_contact: None,
        }
    }
}

impl HhFamilyBoard {
    pub fn headhunter() -> ScoutResult<Self> {
        Ok(Self {
            name: "hh.ru",
            state_stem: "VacanciesHHRU",
            base_url: Url::parse("https://hh.ru")?,
            layout: AreaLayout::Countries,
            headers: BTreeMap::new(),
            deliver_without_contacts: true,
        })
    }

    pub fn zarplata() -> ScoutResult<Self> {
        Ok(Self {
            name: "zarplata.ru",
            state_stem: "VacanciesZarplataRU",
            base_url: Url::parse("https://zarplata.ru")?,
            layout: AreaLayout::Regions,
            headers: BTreeMap::new(),
            // zarplata.ru keeps contactless vacancies for the next cycle
            deliver_without_contacts: false,
        })
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    fn endpoint(&self, path: &str) -> ScoutResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn request(&self, url: Url) -> HttpRequest {
        HttpRequest::new(url).with_headers(&self.headers)
    }

    fn json_request(&self, url: Url) -> HttpRequest {
        self.request(url)
            .with_header("Accept", "application/json")
            .with_header("X-Requested-With", "XMLHttpRequest")
    }

    fn taxonomy_from_state(&self, state: AdvancedSearchState) -> Taxonomy {
        let countries = match self.layout {
            AreaLayout::Countries => state
                .area_tree
                .into_iter()
                .filter(|country| country.text == HOME_COUNTRY)
                .map(|country| Country {
                    name: country.text,
                    regions: country.items.into_iter().map(region_from_node).collect(),
                })
                .collect(),
            AreaLayout::Regions => vec![Country {
                name: HOME_COUNTRY.to_string(),
                regions: state.area_tree.into_iter().map(region_from_node).collect(),
            }],
        };

        let role_groups = state
            .professional_role_tree
            .items
            .into_iter()
            .map(|group| RoleGroup {
                name: group.text,
                roles: group
                    .items
                    .into_iter()
                    .map(|role| TaxonomyEntry::new(role.id, role.text))
                    .collect(),
            })
            .collect();

        Taxonomy {
            countries,
            role_groups,
        }
    }

    fn stale_or_unexpected(&self, response: HttpResponse) -> ScoutError {
        if response.status == STALE_VERSION_STATUS {
            ScoutError::StaleVersion {
                board: self.name.to_string(),
            }
        } else {
            ScoutError::UnexpectedStatus {
                url: response.url,
                status: response.status,
            }
        }
    }
}

fn region_from_node(node: AreaNode) -> Region {
    Region {
        id: Some(node.id),
        name: node.text,
        locations: node
            .items
            .into_iter()
            .map(|location| TaxonomyEntry::new(location.id, location.text))
            .collect(),
    }
}

#[async_trait]
impl JobBoard for HhFamilyBoard {
    fn name(&self) -> &str {
        self.name
    }

    fn state_stem(&self) -> &str {
        self.state_stem
    }

    fn with_parser(self, parser: &ParserSettings) -> Self {
        let board = self.with_headers(parser.headers.clone());
        match &parser.base_url {
            Some(base_url) => board.with_base_url(base_url.clone()),
            None => board,
        }
    }

    fn deliver_without_contacts(&self) -> bool {
        self.deliver_without_contacts
    }

    async fn load_taxonomy(
        &self,
        scraper: &dyn Scraper,
        retry: &RetryConfig,
    ) -> ScoutResult<Taxonomy> {
        let url = self.endpoint("/search/vacancy/advanced?hhtmFrom=main")?;
        info!("Loading {} catalog from {}", self.name, url);

        let response = scraper
            .fetch(self.request(url), retry)
            .await?
            .ensure_ok()?;
        let state = extract_json_by_id(&response.body, EMBEDDED_STATE_ID)?;
        let state: AdvancedSearchState = serde_json::from_value(state)?;

        let taxonomy = self.taxonomy_from_state(state);
        debug!(
            "{} catalog: {} regions, {} roles",
            self.name,
            taxonomy
                .countries
                .iter()
                .map(|country| country.regions.len())
                .sum::<usize>(),
            taxonomy.roles().count()
        );
        Ok(taxonomy)
    }

    async fn fetch_page(
        &self,
        scraper: &dyn Scraper,
        query: PageQuery<'_>,
        retry: &RetryConfig,
    ) -> ScoutResult<SearchPage> {
        let mut url = self.endpoint("/search/vacancy")?;
        url.query_pairs_mut()
            .append_pair("L_save_area", "true")
            .append_pair("professional_role", &query.target.role_id)
            .append_pair("area", &query.target.location_id)
            .append_pair("experience", "doesNotMatter")
            .append_pair("order_by", query.order.as_str())
            .append_pair("search_period", "0")
            .append_pair("items_on_page", &PAGE_SIZE.to_string())
            .append_pair("page", &query.page.to_string())
            .append_pair("disableBrowserCache", "true");

        let mut request = self.json_request(url);
        if let Some(version) = &query.session.static_version {
            request = request.with_header("X-Static-Version", version.as_str());
        }

        let response = scraper.fetch(request, retry).await?;
        if !response.is_ok() {
            return Err(self.stale_or_unexpected(response));
        }

        let envelope: SearchEnvelope = response.json()?;
        let result = envelope.vacancy_search_result;
        let has_next = result
            .paging
            .and_then(|paging| paging.next)
            .is_some_and(|next| next.page != query.page);

        Ok(SearchPage {
            vacancies: result.vacancies.into_iter().map(Into::into).collect(),
            continuation: Continuation::Cursor { has_next },
        })
    }

    async fn refresh_session(
        &self,
        scraper: &dyn Scraper,
        retry: &RetryConfig,
    ) -> ScoutResult<BoardSession> {
        let url = self.endpoint(
            "/search/vacancy?order_by=relevance&items_on_page=50&hhtmFrom=vacancy_search_filter",
        )?;
        let response = scraper
            .fetch(self.request(url), retry)
            .await?
            .ensure_ok()?;

        let version = extract_build_version(&response.body).ok_or_else(|| {
            ScoutError::ExtractionError(format!("{} page carries no build version", self.name))
        })?;
        info!("{} static version is now {}", self.name, version);

        Ok(BoardSession {
            static_version: Some(version),
        })
    }

    async fn fetch_contacts(
        &self,
        scraper: &dyn Scraper,
        vacancy: &VacancyRecord,
        retry: &RetryConfig,
    ) -> ScoutResult<ContactInfo> {
        let Some(employer_id) = &vacancy.employer_id else {
            return Ok(ContactInfo::default());
        };

        let mut url = self.endpoint(&format!("/vacancy/{}/contacts", vacancy.id))?;
        url.query_pairs_mut().append_pair("employerId", employer_id);

        let response = scraper
            .fetch(self.json_request(url), &retry.transport_only())
            .await?;
        if !response.is_ok() {
            debug!(
                "No contacts for vacancy {} (status {})",
                vacancy.id, response.status
            );
            return Ok(ContactInfo::default());
        }

        let body: serde_json::Value = response.json()?;
        Ok(contact_from_json(&body))
    }
}
