use super::post::Category;

/// Category selector on the list screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn cycle(&self) -> Self {
        match self {
            CategoryFilter::All => CategoryFilter::Only(Category::ALL[0]),
            CategoryFilter::Only(Category::Etc) => CategoryFilter::All,
            CategoryFilter::Only(c) => CategoryFilter::Only(c.next()),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CategoryFilter::All => "All",
            CategoryFilter::Only(c) => c.label(),
        }
    }

    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => *c == category,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Latest,
    Popular,
}

impl SortMode {
    pub fn toggle(&self) -> Self {
        match self {
            SortMode::Latest => SortMode::Popular,
            SortMode::Popular => SortMode::Latest,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortMode::Latest => "Latest",
            SortMode::Popular => "Popular",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_filter_cycles_through_all() {
        let mut filter = CategoryFilter::All;
        let mut seen = Vec::new();
        for _ in 0..6 {
            filter = filter.cycle();
            seen.push(filter.label());
        }
        assert_eq!(seen, ["Couple", "Friend", "Work", "Family", "Etc", "All"]);
    }
}
