use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeCategory {
    Senior,
    Junior,
    Youth,
}

impl AgeCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            AgeCategory::Senior => "Senior",
            AgeCategory::Junior => "Junior",
            AgeCategory::Youth => "Youth",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Senior" => Some(AgeCategory::Senior),
            "Junior" => Some(AgeCategory::Junior),
            "Youth" => Some(AgeCategory::Youth),
            _ => None,
        }
    }
}

impl fmt::Display for AgeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Men,
    Women,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Men => "Men",
            Gender::Women => "Women",
        }
    }

    /// Query-string code used by the source site.
    pub fn code(self) -> &'static str {
        match self {
            Gender::Men => "m",
            Gender::Women => "w",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Men" => Some(Gender::Men),
            "Women" => Some(Gender::Women),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One page request: which program, age group and gender to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryConfig {
    pub program: &'static str,
    pub age_category: AgeCategory,
    pub gender: Gender,
}

impl QueryConfig {
    const fn current(age_category: AgeCategory, gender: Gender) -> Self {
        Self {
            program: "current",
            age_category,
            gender,
        }
    }

    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}?ranking_curprog={}&ranking_agegroup={}&ranking_gender={}",
            base_url,
            self.program,
            self.age_category.as_str(),
            self.gender.code()
        )
    }
}

impl fmt::Display for QueryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.age_category, self.gender)
    }
}

/// Pages scraped on every run, in fetch order.
pub const CONFIGURATIONS: [QueryConfig; 6] = [
    QueryConfig::current(AgeCategory::Senior, Gender::Men),
    QueryConfig::current(AgeCategory::Senior, Gender::Women),
    QueryConfig::current(AgeCategory::Junior, Gender::Women),
    QueryConfig::current(AgeCategory::Junior, Gender::Men),
    QueryConfig::current(AgeCategory::Youth, Gender::Men),
    QueryConfig::current(AgeCategory::Youth, Gender::Women),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldRecord {
    pub age_category: AgeCategory,
    pub gender: Gender,
    pub weight_class: String,
    pub snatch_record: Option<u32>,
    pub cj_record: Option<u32>,
    pub total_record: Option<u32>,
}

/// Identity of a record within a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub age_category: AgeCategory,
    pub gender: Gender,
    pub weight_class: String,
}

impl WorldRecord {
    pub fn key(&self) -> RecordKey {
        RecordKey {
            age_category: self.age_category,
            gender: self.gender,
            weight_class: self.weight_class.clone(),
        }
    }

    pub fn lift(&self, lift: Lift) -> Option<u32> {
        match lift {
            Lift::Snatch => self.snatch_record,
            Lift::CleanAndJerk => self.cj_record,
            Lift::Total => self.total_record,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lift {
    Snatch,
    CleanAndJerk,
    Total,
}

impl Lift {
    pub const ALL: [Lift; 3] = [Lift::Snatch, Lift::CleanAndJerk, Lift::Total];

    pub fn label(self) -> &'static str {
        match self {
            Lift::Snatch => "Snatch",
            Lift::CleanAndJerk => "C&J",
            Lift::Total => "Total",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configurations_cover_every_group_once() {
        for age in [AgeCategory::Senior, AgeCategory::Junior, AgeCategory::Youth] {
            for gender in [Gender::Men, Gender::Women] {
                let n = CONFIGURATIONS
                    .iter()
                    .filter(|c| c.age_category == age && c.gender == gender)
                    .count();
                assert_eq!(n, 1, "{} {}", age, gender);
            }
        }
    }

    #[test]
    fn url_encodes_group_and_gender() {
        let url = CONFIGURATIONS[2].url("https://iwf.sport/results/world-records/");
        assert_eq!(
            url,
            "https://iwf.sport/results/world-records/?ranking_curprog=current&ranking_agegroup=Junior&ranking_gender=w"
        );
    }

    #[test]
    fn record_serializes_with_plain_names() {
        let r = WorldRecord {
            age_category: AgeCategory::Youth,
            gender: Gender::Women,
            weight_class: "+77kg".into(),
            snatch_record: Some(101),
            cj_record: None,
            total_record: None,
        };
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["age_category"], "Youth");
        assert_eq!(v["gender"], "Women");
        assert!(v["cj_record"].is_null());
    }
}
