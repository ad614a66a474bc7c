//! Job-board search and upskilling links for a predicted role.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobLinks {
    pub linkedin: String,
    pub indeed: String,
    pub glassdoor: String,
}

/// Search URLs on the three job boards for `role` in `domain`.
pub fn job_links(role: &str, domain: &str) -> JobLinks {
    let query = format!("{}+{}", plus_spaces(role), plus_spaces(domain));
    JobLinks {
        linkedin: format!("https://www.linkedin.com/jobs/search/?keywords={query}"),
        indeed: format!("https://www.indeed.com/jobs?q={query}"),
        glassdoor: format!("https://www.glassdoor.com/Job/jobs.htm?sc.keyword={query}"),
    }
}

/// Web search for online courses covering `skill`.
pub fn upskill_link(skill: &str) -> String {
    format!(
        "https://www.google.com/search?q=learn+{}+online",
        plus_spaces(skill)
    )
}

fn plus_spaces(s: &str) -> String {
    s.replace(' ', "+")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_links_join_role_and_domain() {
        let links = job_links("Data Analyst", "Real Estate");
        assert_eq!(
            links.linkedin,
            "https://www.linkedin.com/jobs/search/?keywords=Data+Analyst+Real+Estate"
        );
        assert_eq!(links.indeed, "https://www.indeed.com/jobs?q=Data+Analyst+Real+Estate");
        assert!(links.glassdoor.ends_with("sc.keyword=Data+Analyst+Real+Estate"));
    }

    #[test]
    fn test_upskill_link() {
        assert_eq!(
            upskill_link("machine learning"),
            "https://www.google.com/search?q=learn+machine+learning+online"
        );
    }
}
