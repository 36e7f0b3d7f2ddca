use indexmap::IndexMap;

use core_types::UseCase;

use crate::filter::{ALL_TECHNOLOGIES, KNOWN_TECHNOLOGIES};

pub fn industry_counts(use_cases: &[UseCase]) -> IndexMap<String, usize> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for industry in industries(use_cases) {
        let count = use_cases
            .iter()
            .filter(|use_case| use_case.industry == industry)
            .count();
        counts.push((industry, count));
    }
    counts.sort_by(|(left, left_count), (right, right_count)| {
        right_count.cmp(left_count).then_with(|| left.cmp(right))
    });
    counts.into_iter().collect()
}

pub fn technology_counts(use_cases: &[UseCase]) -> IndexMap<String, usize> {
    let mut counts = IndexMap::new();
    counts.insert(ALL_TECHNOLOGIES.to_string(), use_cases.len());
    for technology in KNOWN_TECHNOLOGIES {
        let count = use_cases
            .iter()
            .filter(|use_case| use_case.technology.contains(technology))
            .count();
        counts.insert(technology.to_string(), count);
    }
    counts
}

pub fn industries(use_cases: &[UseCase]) -> Vec<String> {
    let mut industries: Vec<String> = use_cases
        .iter()
        .map(|use_case| use_case.industry.clone())
        .collect();
    industries.sort();
    industries.dedup();
    industries
}
