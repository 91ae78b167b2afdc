use super::{contact_from_json, id_text, non_empty, HOME_COUNTRY};
use crate::catalog::{Country, QueryTarget, Region, RoleGroup, Taxonomy, TaxonomyEntry};
use crate::config::ParserSettings;
use crate::core::retry::RetryConfig;
use crate::core::{JobBoard, PageQuery};
use crate::http::HttpRequest;
use crate::models::{Continuation, SearchPage, VacancyId, VacancyRecord};
use crate::scrapers::Scraper;
use crate::ScoutResult;
use async_trait::async_trait;
use log::{debug, info};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use url::Url;

const PAGE_SIZE: usize = 40;
const CATALOGUE_LIMIT: usize = 15;
const DOMAIN: &str = "700";
const VACANCY_INCLUDE: &str = "mainInfo,companyInfo,contactInfo,town";

/// superjob.ru through its JSON:API frontend endpoints. Contacts come inline
/// with each listing.
#[derive(Debug, Clone)]
pub struct SuperJobBoard {
    base_url: Url,
    headers: BTreeMap<String, String>,
}

impl SuperJobBoard {
    pub fn new() -> ScoutResult<Self> {
        Ok(Self {
            base_url: Url::parse("https://www.superjob.ru")?,
            headers: BTreeMap::new(),
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

    async fn get_json(
        &self,
        scraper: &dyn Scraper,
        url: Url,
        retry: &RetryConfig,
    ) -> ScoutResult<Value> {
        let request = HttpRequest::new(url)
            .with_headers(&self.headers)
            .with_header("Accept", "application/json");
        scraper.fetch(request, retry).await?.ensure_ok()?.json()
    }

    fn vacancy_url(&self, id: &VacancyId) -> Option<String> {
        self.base_url
            .join(&format!("/vakansii/{}.html", id))
            .ok()
            .map(String::from)
    }

    /// Folds `included` rows into their listing by shared id, keyed by row type.
    fn records_from_document(&self, document: &Value, target: &QueryTarget) -> Vec<VacancyRecord> {
        let mut rows: BTreeMap<String, (Value, HashMap<&str, &Value>)> = BTreeMap::new();
        let mut order = Vec::new();
        for item in list(document, "data") {
            if let Some(id) = item.get("id").and_then(id_text) {
                order.push(id.clone());
                rows.insert(id, (item["id"].clone(), HashMap::new()));
            }
        }
        for row in list(document, "included") {
            let (Some(id), Some(kind)) = (
                row.get("id").and_then(id_text),
                row.get("type").and_then(Value::as_str),
            ) else {
                continue;
            };
            if let Some((_, parts)) = rows.get_mut(&id) {
                parts.insert(kind, row);
            }
        }

        order
            .iter()
            .filter_map(|id| rows.get(id))
            .map(|(raw_id, parts)| {
                let id = match raw_id {
                    Value::Number(number) => number
                        .as_u64()
                        .map(VacancyId::Numeric)
                        .unwrap_or_else(|| VacancyId::Text(number.to_string())),
                    other => VacancyId::Text(id_text(other).unwrap_or_default()),
                };
                let attributes = |kind: &str| {
                    parts
                        .get(kind)
                        .and_then(|row| row.get("attributes"))
                        .cloned()
                        .unwrap_or(Value::Null)
                };
                let contact = attributes("vacancyContactInfo");
                let contact_hidden = contact
                    .get("isContactPersonHidden")
                    .and_then(Value::as_bool)
                    .unwrap_or(true);

                VacancyRecord {
                    title: non_empty(attributes("vacancyMainInfo").get("profession")),
                    company_name: non_empty(attributes("vacancyCompanyInfo").get("name")),
                    city_name: Some(target.location_name.clone()),
                    url: self.vacancy_url(&id),
                    contact_flag: !contact_hidden,
                    inline_contact: Some(contact_from_json(&contact)),
                    ..VacancyRecord::new(id)
                }
            })
            .collect()
    }
}

fn list<'a>(document: &'a Value, key: &str) -> &'a [Value] {
    document
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn roles_from_catalogue(document: &Value) -> Vec<RoleGroup> {
    let labels: HashMap<String, String> = list(document, "included")
        .iter()
        .filter_map(|row| {
            let id = row.get("id").and_then(id_text)?;
            let label = non_empty(row.pointer("/attributes/label"))?;
            Some((id, label))
        })
        .collect();

    list(document, "data")
        .iter()
        .map(|group| RoleGroup {
            name: non_empty(group.pointer("/attributes/label")),
            roles: group
                .pointer("/relationships/subCatalogues/data")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default()
                .iter()
                .filter_map(|sub| {
                    let id = sub.get("id").and_then(id_text)?;
                    let label = labels.get(&id)?;
                    Some(TaxonomyEntry::new(id, label.clone()))
                })
                .collect(),
        })
        .collect()
}

fn regions_from_geo(document: &Value) -> Vec<Region> {
    let included = list(document, "included");
    let Some(home_id) = included
        .iter()
        .find(|row| {
            row.get("type").and_then(Value::as_str) == Some("country")
                && row.pointer("/attributes/name").and_then(Value::as_str) == Some(HOME_COUNTRY)
        })
        .and_then(|row| row.get("id").and_then(id_text))
    else {
        return Vec::new();
    };

    included
        .iter()
        .filter(|row| {
            row.pointer("/relationships/country/data/id")
                .and_then(id_text)
                .is_some_and(|country| country == home_id)
        })
        .filter_map(|row| {
            Some(Region {
                id: Some(row.get("id").and_then(id_text)?),
                name: non_empty(row.pointer("/attributes/name"))?,
                locations: Vec::new(),
            })
        })
        .collect()
}

#[async_trait]
impl JobBoard for SuperJobBoard {
    fn name(&self) -> &str {
        "superjob.ru"
    }

    fn state_stem(&self) -> &str {
        "VacanciesSuperJobRU"
    }

    fn with_parser(self, parser: &ParserSettings) -> Self {
        let board = self.with_headers(parser.headers.clone());
        match &parser.base_url {
            Some(base_url) => board.with_base_url(base_url.clone()),
            None => board,
        }
    }

    async fn load_taxonomy(
        &self,
        scraper: &dyn Scraper,
        retry: &RetryConfig,
    ) -> ScoutResult<Taxonomy> {
        let mut catalogue_url = self.endpoint("/jsapi3/0.1/catalogue/")?;
        catalogue_url
            .query_pairs_mut()
            .append_pair("page[limit]", &CATALOGUE_LIMIT.to_string())
            .append_pair("page[offset]", "0");
        info!("Loading superjob.ru catalogue from {}", catalogue_url);
        let catalogue = self.get_json(scraper, catalogue_url, retry).await?;

        let mut geo_url = self.endpoint("/jsapi3/0.1/geo/")?;
        geo_url
            .query_pairs_mut()
            .append_pair(
                "include",
                "country,region.country,subject.country,subject.region,town[subject,country,landingInfo],town.subject.region,domain.domainType",
            )
            .append_pair("filters[type]", "country,subject,town,region")
            .append_pair("filters[domain]", DOMAIN);
        let geo = self.get_json(scraper, geo_url, retry).await?;

        let regions = regions_from_geo(&geo);
        let role_groups = roles_from_catalogue(&catalogue);
        debug!(
            "superjob.ru catalog: {} regions, {} role groups",
            regions.len(),
            role_groups.len()
        );

        Ok(Taxonomy {
            countries: vec![Country {
                name: HOME_COUNTRY.to_string(),
                regions,
            }],
            role_groups,
        })
    }

    async fn fetch_page(
        &self,
        scraper: &dyn Scraper,
        query: PageQuery<'_>,
        retry: &RetryConfig,
    ) -> ScoutResult<SearchPage> {
        let mut url = self.endpoint("/jsapi3/0.1/vacancy/")?;
        url.query_pairs_mut()
            .append_pair("page[limit]", &PAGE_SIZE.to_string())
            .append_pair("page[offset]", &(query.page * PAGE_SIZE).to_string())
            .append_pair("include", VACANCY_INCLUDE)
            .append_pair("filters[town]", &query.target.location_id)
            .append_pair("filters[catalogues]", &query.target.role_id)
            .append_pair("filters[domain]", DOMAIN)
            .append_pair("fields[vacancyMainInfo]", "profession,updatedAt")
            .append_pair("fields[vacancyCompanyInfo]", "name,isAnonymous");

        let document = self.get_json(scraper, url, retry).await?;
        Ok(SearchPage {
            vacancies: self.records_from_document(&document, query.target),
            continuation: Continuation::UntilEmpty,
        })
    }
}
