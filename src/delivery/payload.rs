use crate::models::{ContactInfo, VacancyRecord};
use crate::ScoutResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body shape a webhook endpoint expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadFormat {
    /// CRM lead: contact person plus a visit marker and source fields.
    Lead,
    /// Flat contact record with a semicolon-joined summary line.
    Contacts,
}

#[derive(Debug, Serialize)]
struct LeadFields<'a> {
    site: &'a str,
    source: &'a str,
    promocode: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct LeadPayload<'a> {
    city: Option<&'a str>,
    company_name: Option<&'a str>,
    vacancy_url: Option<&'a str>,
    title: Option<&'a str>,
    name: Option<&'a str>,
    email: Option<&'a str>,
    phone: Option<&'a str>,
    comment: Option<&'a str>,
    roistat_visit: &'a str,
    fields: LeadFields<'a>,
}

#[derive(Debug, Serialize)]
struct ContactsPayload<'a> {
    vacancy_name: Option<&'a str>,
    city: Option<&'a str>,
    company_name: Option<&'a str>,
    vacancy_url: Option<&'a str>,
    source: &'a str,
    name: Option<&'a str>,
    email: Option<&'a str>,
    phone: Option<&'a str>,
    data: String,
}

/// An enriched vacancy ready to be sent.
#[derive(Debug, Clone, Copy)]
pub struct Delivery<'a> {
    pub vacancy: &'a VacancyRecord,
    pub contact: &'a ContactInfo,
    pub source: &'a str,
}

impl<'a> Delivery<'a> {
    pub fn new(vacancy: &'a VacancyRecord, contact: &'a ContactInfo, source: &'a str) -> Self {
        Self {
            vacancy,
            contact,
            source,
        }
    }

    /// `title;company;url;name;email;phone;city`, absent fields left empty.
    /// Also the row written to the delivery log.
    pub fn summary_line(&self) -> String {
        [
            self.vacancy.title.as_deref(),
            self.vacancy.company_name.as_deref(),
            self.vacancy.url.as_deref(),
            self.contact.full_name.as_deref(),
            self.contact.email.as_deref(),
            self.contact.phone.as_deref(),
            self.vacancy.city_name.as_deref(),
        ]
        .iter()
        .map(|field| field.unwrap_or_default())
        .collect::<Vec<_>>()
        .join(";")
    }

    pub fn payload(&self, format: PayloadFormat) -> ScoutResult<Value> {
        let vacancy = self.vacancy;
        let contact = self.contact;
        let value = match format {
            PayloadFormat::Lead => serde_json::to_value(LeadPayload {
                city: vacancy.city_name.as_deref(),
                company_name: vacancy.company_name.as_deref(),
                vacancy_url: vacancy.url.as_deref(),
                title: vacancy.title.as_deref(),
                name: contact.full_name.as_deref(),
                email: contact.email.as_deref(),
                phone: contact.phone.as_deref(),
                comment: vacancy.url.as_deref(),
                roistat_visit: vacancy.creation_site.as_deref().unwrap_or(self.source),
                fields: LeadFields {
                    site: self.source,
                    source: self.source,
                    promocode: None,
                },
            })?,
            PayloadFormat::Contacts => serde_json::to_value(ContactsPayload {
                vacancy_name: vacancy.title.as_deref(),
                city: vacancy.city_name.as_deref(),
                company_name: vacancy.company_name.as_deref(),
                vacancy_url: vacancy.url.as_deref(),
                source: self.source,
                name: contact.full_name.as_deref(),
                email: contact.email.as_deref(),
                phone: contact.phone.as_deref(),
                data: self.summary_line(),
            })?,
        };
        Ok(value)
    }
}
