//! Keyword taxonomy and text normalization for overlap detection.
//!
//! Matching is plain substring containment on normalized text: no stemming and
//! no token boundaries. "go" therefore also matches inside "google".

use serde::{Deserialize, Serialize};

/// Lowercases, trims and collapses runs of whitespace into a single space.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Substring containment of `keyword` in `corpus_text`, both normalized.
/// An empty keyword never matches.
pub fn contains_keyword(corpus_text: &str, keyword: &str) -> bool {
    Corpus::new(corpus_text).contains(&normalize(keyword))
}

/// Normalized text searched for keyword presence. Normalizing once lets the
/// scorer check every taxonomy entry without re-normalizing the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus(String);

impl Corpus {
    pub fn new(text: &str) -> Self {
        Self(normalize(text))
    }

    /// `normalized_keyword` must already be normalized.
    pub fn contains(&self, normalized_keyword: &str) -> bool {
        !normalized_keyword.is_empty() && self.0.contains(normalized_keyword)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Additive bonus awarded when both corpora mention the same milestone term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BonusFields")]
pub struct MilestoneBonus {
    pub term: String,
    pub points: u32,
}

impl MilestoneBonus {
    pub fn new(term: &str, points: u32) -> Self {
        Self {
            term: normalize(term),
            points,
        }
    }
}

#[derive(Deserialize)]
struct BonusFields {
    term: String,
    points: u32,
}

impl From<BonusFields> for MilestoneBonus {
    fn from(fields: BonusFields) -> Self {
        MilestoneBonus::new(&fields.term, fields.points)
    }
}

/// Ordered keyword vocabulary plus the milestone bonus table.
///
/// Call sites that want a different vocabulary or weights build their own
/// `Taxonomy` instead of forking the scorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TaxonomyFields")]
pub struct Taxonomy {
    keywords: Vec<String>,
    bonuses: Vec<MilestoneBonus>,
}

impl Taxonomy {
    /// Normalizes every keyword, dropping empties and later duplicates.
    pub fn new<I, S>(keywords: I, bonuses: Vec<MilestoneBonus>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for keyword in keywords {
            let keyword = normalize(keyword.as_ref());
            if !keyword.is_empty() && !normalized.contains(&keyword) {
                normalized.push(keyword);
            }
        }
        let bonuses = bonuses
            .into_iter()
            .filter(|b| !b.term.is_empty())
            .collect();
        Self {
            keywords: normalized,
            bonuses,
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn bonuses(&self) -> &[MilestoneBonus] {
        &self.bonuses
    }
}

/// Wire shape of a taxonomy loaded from configuration; routed through
/// `Taxonomy::new` so loaded entries are normalized like built ones.
#[derive(Deserialize)]
struct TaxonomyFields {
    keywords: Vec<String>,
    #[serde(default)]
    bonuses: Vec<MilestoneBonus>,
}

impl From<TaxonomyFields> for Taxonomy {
    fn from(fields: TaxonomyFields) -> Self {
        Taxonomy::new(fields.keywords, fields.bonuses)
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS.iter().copied(), default_bonuses())
    }
}

/// experience +5, bachelor +5, master +7, phd +10.
pub fn default_bonuses() -> Vec<MilestoneBonus> {
    vec![
        MilestoneBonus::new("experience", 5),
        MilestoneBonus::new("bachelor", 5),
        MilestoneBonus::new("master", 7),
        MilestoneBonus::new("phd", 10),
    ]
}

/// Canonical vocabulary: technologies, credentials, seniority words and
/// soft-skill phrases.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    // languages and frameworks
    "javascript",
    "react",
    "node",
    "python",
    "java",
    "c++",
    "sql",
    "nosql",
    "mongodb",
    "react native",
    "angular",
    "vue",
    "typescript",
    "html",
    "css",
    "sass",
    "php",
    "c#",
    ".net",
    "ruby",
    "go",
    "rust",
    "swift",
    "kotlin",
    "flutter",
    // platforms and infrastructure
    "aws",
    "cloud",
    "docker",
    "kubernetes",
    "devops",
    "android",
    "ios",
    "networking",
    "linux",
    "windows",
    "macos",
    "database",
    "infrastructure",
    "automation",
    "ci/cd",
    "jenkins",
    "blockchain",
    "crypto",
    // tooling
    "git",
    "github",
    "gitlab",
    "bitbucket",
    "jira",
    "confluence",
    "slack",
    "excel",
    "word",
    "powerpoint",
    "figma",
    "sketch",
    "adobe",
    "photoshop",
    "illustrator",
    "indesign",
    "xd",
    // disciplines
    "full stack",
    "frontend",
    "backend",
    "mobile",
    "web",
    "design",
    "testing",
    "qa",
    "security",
    "data",
    "analytics",
    "machine learning",
    "ai",
    "ui",
    "ux",
    "research",
    "sales",
    "marketing",
    "finance",
    "accounting",
    "hr",
    "operations",
    "product",
    "ecommerce",
    "analysis",
    "engineering",
    // process
    "agile",
    "scrum",
    "project management",
    // credentials
    "bachelor",
    "master",
    "phd",
    "degree",
    "certification",
    // seniority and roles
    "manager",
    "senior",
    "junior",
    "lead",
    "director",
    "vp",
    "ceo",
    "cto",
    "cfo",
    "coo",
    // soft skills
    "leadership",
    "team",
    "communication",
    "problem solving",
];
