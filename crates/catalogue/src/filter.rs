use core_types::UseCase;

pub const ALL_INDUSTRIES: &str = "All Industries";
pub const ALL_TECHNOLOGIES: &str = "All Technologies";
pub const KNOWN_TECHNOLOGIES: [&str; 2] = ["Copilot Studio", "Power Automate"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IndustryFilter {
    #[default]
    All,
    Only(String),
}

impl IndustryFilter {
    pub fn from_label(label: &str) -> Self {
        if label == ALL_INDUSTRIES {
            IndustryFilter::All
        } else {
            IndustryFilter::Only(label.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            IndustryFilter::All => ALL_INDUSTRIES,
            IndustryFilter::Only(industry) => industry,
        }
    }

    fn matches(&self, use_case: &UseCase) -> bool {
        match self {
            IndustryFilter::All => true,
            IndustryFilter::Only(industry) => use_case.industry == *industry,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TechnologyFilter {
    #[default]
    All,
    Only(String),
}

impl TechnologyFilter {
    pub fn from_label(label: &str) -> Self {
        if label == ALL_TECHNOLOGIES {
            TechnologyFilter::All
        } else {
            TechnologyFilter::Only(label.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TechnologyFilter::All => ALL_TECHNOLOGIES,
            TechnologyFilter::Only(technology) => technology,
        }
    }

    fn matches(&self, use_case: &UseCase) -> bool {
        match self {
            TechnologyFilter::All => true,
            TechnologyFilter::Only(technology) => use_case.technology.contains(technology.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogueFilter {
    pub industry: IndustryFilter,
    pub technology: TechnologyFilter,
    pub search: String,
}

impl CatalogueFilter {
    pub fn matches(&self, use_case: &UseCase) -> bool {
        self.industry.matches(use_case)
            && self.technology.matches(use_case)
            && matches_search(&self.search, use_case)
    }

    pub fn apply<'a>(&self, use_cases: &'a [UseCase]) -> Vec<&'a UseCase> {
        use_cases
            .iter()
            .filter(|use_case| self.matches(use_case))
            .collect()
    }
}

fn matches_search(search: &str, use_case: &UseCase) -> bool {
    if search.is_empty() {
        return true;
    }
    let needle = search.to_lowercase();
    use_case.title.to_lowercase().contains(&needle)
        || use_case.mini_description.to_lowercase().contains(&needle)
}
