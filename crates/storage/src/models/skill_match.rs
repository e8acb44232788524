//! Skill overlap scoring between a candidate and a team's needed skills.

/// Skills the candidate brings that the team still needs, deduplicated and
/// ordered by the needed-skill list so results are stable across calls.
pub fn matching_skills(candidate_skills: &[String], needed_skills: &[String]) -> Vec<String> {
    let mut matching: Vec<String> = Vec::new();

    for skill in needed_skills {
        if candidate_skills.iter().any(|s| s == skill) && !matching.contains(skill) {
            matching.push(skill.clone());
        }
    }

    matching
}

/// Percentage of the team's needed skills covered by the candidate, truncated
/// to an integer in 0..=100. Returns 0 when either list is empty.
pub fn match_percentage(candidate_skills: &[String], needed_skills: &[String]) -> i32 {
    if candidate_skills.is_empty() || needed_skills.is_empty() {
        return 0;
    }

    let matching = matching_skills(candidate_skills, needed_skills);
    (matching.len() as f64 / needed_skills.len() as f64 * 100.0) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_superset_is_full_match() {
        let candidate = skills(&["Backend", "Frontend", "Design"]);
        let needed = skills(&["Backend", "Frontend"]);
        assert_eq!(match_percentage(&candidate, &needed), 100);
    }

    #[test]
    fn test_disjoint_is_zero() {
        let candidate = skills(&["Design"]);
        let needed = skills(&["Backend", "Frontend"]);
        assert_eq!(match_percentage(&candidate, &needed), 0);
        assert!(matching_skills(&candidate, &needed).is_empty());
    }

    #[test]
    fn test_empty_needed_is_zero() {
        let candidate = skills(&["Backend"]);
        assert_eq!(match_percentage(&candidate, &[]), 0);
    }

    #[test]
    fn test_empty_candidate_is_zero() {
        let needed = skills(&["Backend"]);
        assert_eq!(match_percentage(&[], &needed), 0);
    }

    #[test]
    fn test_partial_match_truncates() {
        let candidate = skills(&["Backend"]);
        let needed = skills(&["Backend", "Frontend", "ML"]);
        // 1/3 = 33.3..%, truncated
        assert_eq!(match_percentage(&candidate, &needed), 33);
    }

    #[test]
    fn test_matching_skills_ordered_by_needed_list() {
        let candidate = skills(&["ML", "Backend"]);
        let needed = skills(&["Backend", "Frontend", "ML"]);
        assert_eq!(
            matching_skills(&candidate, &needed),
            skills(&["Backend", "ML"])
        );
    }

    #[test]
    fn test_matching_skills_deduplicated() {
        let candidate = skills(&["Backend"]);
        let needed = skills(&["Backend", "Backend"]);
        assert_eq!(matching_skills(&candidate, &needed), skills(&["Backend"]));
    }
}
