//! Profile Models
//! Mission: Profile documents, their experience/education entries, and request bodies

use crate::auth::models::UserSummary;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A member profile, one per user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    /// Owning user id; the row key, not part of the stored document
    #[serde(skip)]
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub status: String,
    pub skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub githubusername: Option<String>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub social: SocialLinks,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SocialLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Experience {
    pub id: String,
    pub title: String,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub from: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Education {
    pub id: String,
    pub college: String,
    pub degree: String,
    pub fieldofstudy: String,
    pub from: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Validated create/update fields, see [`ProfileRequest::into_fields`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileFields {
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub status: Option<String>,
    pub githubusername: Option<String>,
    pub skills: Option<Vec<String>>,
    pub social: SocialLinks,
}

impl Profile {
    pub fn new(user_id: &str, fields: ProfileFields) -> Self {
        let mut profile = Profile {
            user_id: user_id.to_string(),
            company: None,
            website: None,
            location: None,
            status: String::new(),
            skills: Vec::new(),
            bio: None,
            githubusername: None,
            experience: Vec::new(),
            education: Vec::new(),
            social: SocialLinks::default(),
            date: Utc::now(),
        };
        profile.apply(fields);
        profile
    }

    /// Overwrite the provided fields, keep the rest. Social links are
    /// replaced as a whole.
    pub fn apply(&mut self, fields: ProfileFields) {
        let ProfileFields {
            company,
            website,
            location,
            bio,
            status,
            githubusername,
            skills,
            social,
        } = fields;

        if company.is_some() {
            self.company = company;
        }
        if website.is_some() {
            self.website = website;
        }
        if location.is_some() {
            self.location = location;
        }
        if bio.is_some() {
            self.bio = bio;
        }
        if let Some(status) = status {
            self.status = status;
        }
        if githubusername.is_some() {
            self.githubusername = githubusername;
        }
        if let Some(skills) = skills {
            self.skills = skills;
        }
        self.social = social;
    }

    /// Newest entry first
    pub fn add_experience(&mut self, exp: Experience) {
        self.experience.insert(0, exp);
    }

    /// Returns whether an entry was removed
    pub fn remove_experience(&mut self, exp_id: &str) -> bool {
        let before = self.experience.len();
        self.experience.retain(|e| e.id != exp_id);
        self.experience.len() != before
    }

    pub fn add_education(&mut self, edu: Education) {
        self.education.insert(0, edu);
    }

    pub fn remove_education(&mut self, edu_id: &str) -> bool {
        let before = self.education.len();
        self.education.retain(|e| e.id != edu_id);
        self.education.len() != before
    }
}

/// Profile as returned by the API, with the owner's name and avatar
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProfileView {
    pub user: UserSummary,
    #[serde(flatten)]
    pub profile: Profile,
}

/// Create/update body - POST /api/profile
#[derive(Debug, Default, Deserialize)]
pub struct ProfileRequest {
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub status: Option<String>,
    pub githubusername: Option<String>,
    /// Comma separated
    pub skills: Option<String>,
    pub youtube: Option<String>,
    pub twitter: Option<String>,
    pub facebook: Option<String>,
    pub linkedin: Option<String>,
    pub instagram: Option<String>,
}

impl ProfileRequest {
    /// Drop empty values and split skills on commas.
    pub fn into_fields(self) -> ProfileFields {
        ProfileFields {
            company: non_empty(self.company),
            website: non_empty(self.website),
            location: non_empty(self.location),
            bio: non_empty(self.bio),
            status: non_empty(self.status),
            githubusername: non_empty(self.githubusername),
            skills: non_empty(self.skills).map(|s| split_skills(&s)),
            social: SocialLinks {
                youtube: non_empty(self.youtube),
                twitter: non_empty(self.twitter),
                facebook: non_empty(self.facebook),
                linkedin: non_empty(self.linkedin),
                instagram: non_empty(self.instagram),
            },
        }
    }
}

/// Add-experience body - PUT /api/profile/experience
#[derive(Debug, Default, Deserialize)]
pub struct ExperienceRequest {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub current: Option<bool>,
    pub description: Option<String>,
}

/// Add-education body - PUT /api/profile/education
#[derive(Debug, Default, Deserialize)]
pub struct EducationRequest {
    pub college: Option<String>,
    pub degree: Option<String>,
    pub fieldofstudy: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub current: Option<bool>,
    pub description: Option<String>,
}

pub fn new_entry_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn split_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (date part kept).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|ts| ts.with_timezone(&Utc).date_naive())
        })
}

pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(status: &str, skills: &str) -> ProfileFields {
        ProfileRequest {
            status: Some(status.to_string()),
            skills: Some(skills.to_string()),
            ..Default::default()
        }
        .into_fields()
    }

    fn experience(id: &str) -> Experience {
        Experience {
            id: id.to_string(),
            title: "Engineer".to_string(),
            company: "Acme".to_string(),
            location: None,
            from: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            to: None,
            current: true,
            description: None,
        }
    }

    #[test]
    fn test_skills_split_and_trimmed() {
        assert_eq!(
            split_skills(" rust, go ,,sql "),
            vec!["rust".to_string(), "go".to_string(), "sql".to_string()]
        );
    }

    #[test]
    fn test_update_keeps_unprovided_fields() {
        let mut profile = Profile::new(
            "u1",
            ProfileRequest {
                status: Some("Developer".into()),
                skills: Some("rust".into()),
                company: Some("Acme".into()),
                twitter: Some("@jane".into()),
                ..Default::default()
            }
            .into_fields(),
        );

        profile.apply(fields("Senior Developer", "rust, sql"));

        assert_eq!(profile.status, "Senior Developer");
        assert_eq!(profile.skills, vec!["rust", "sql"]);
        assert_eq!(profile.company.as_deref(), Some("Acme"));
        // social is replaced wholesale
        assert!(profile.social.twitter.is_none());
    }

    #[test]
    fn test_blank_fields_ignored() {
        let f = ProfileRequest {
            company: Some("   ".into()),
            website: Some(String::new()),
            ..Default::default()
        }
        .into_fields();

        assert!(f.company.is_none());
        assert!(f.website.is_none());
    }

    #[test]
    fn test_experience_newest_first_and_removal() {
        let mut profile = Profile::new("u1", fields("Dev", "rust"));
        profile.add_experience(experience("a"));
        profile.add_experience(experience("b"));

        let ids: Vec<_> = profile.experience.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);

        assert!(profile.remove_experience("a"));
        assert!(!profile.remove_experience("missing"));
        assert_eq!(profile.experience.len(), 1);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2021, 6, 15).unwrap();
        assert_eq!(parse_date("2021-06-15"), Some(expected));
        assert_eq!(parse_date("2021-06-15T10:00:00Z"), Some(expected));
        assert_eq!(parse_date("June 15"), None);
    }

    #[test]
    fn test_view_flattens_profile() {
        let profile = Profile::new("u1", fields("Dev", "rust"));
        let view = ProfileView {
            user: UserSummary {
                id: "u1".into(),
                name: Some("Jane".into()),
                avatar: None,
            },
            profile,
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["user"]["name"], "Jane");
        assert_eq!(json["status"], "Dev");
        assert_eq!(json["skills"], json!(["rust"]));
        assert!(json.get("user_id").is_none());
    }
}
