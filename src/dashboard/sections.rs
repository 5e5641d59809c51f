// Collapsible dashboard sections as plain state, independent of any page

use serde::Serialize;

pub const EXPANDED_ICON: &str = "▼";
pub const COLLAPSED_ICON: &str = "▶";

/// Title of the section holding the per-activity detail sections
pub const DETAILED_DATA_TITLE: &str = "Detailed Data";
const DETAIL_ID_PREFIX: &str = "detail-";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Visibility {
    /// Nothing set yet, behaves as hidden
    Unset,
    Shown,
    Hidden,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SectionView {
    pub visibility: Visibility,
    pub icon: &'static str,
    pub collapsed: bool,
}

impl SectionView {
    pub fn expanded() -> Self {
        Self {
            visibility: Visibility::Shown,
            icon: EXPANDED_ICON,
            collapsed: false,
        }
    }

    pub fn collapsed() -> Self {
        Self {
            visibility: Visibility::Hidden,
            icon: COLLAPSED_ICON,
            collapsed: true,
        }
    }

    pub fn is_open(&self) -> bool {
        self.visibility == Visibility::Shown
    }
}

/// Flip a section: hidden or unset opens it, shown closes it
pub fn toggle(current: Visibility) -> SectionView {
    match current {
        Visibility::Unset | Visibility::Hidden => SectionView::expanded(),
        Visibility::Shown => SectionView::collapsed(),
    }
}

/// State on page load: only sections marked open start expanded
pub fn initial_view(marked_open: bool) -> SectionView {
    if marked_open {
        SectionView::expanded()
    } else {
        SectionView::collapsed()
    }
}

/// Element id of the detail section for an activity date
pub fn detail_section_id(date: &str) -> String {
    format!("{DETAIL_ID_PREFIX}{}", date.replace('-', ""))
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Section {
    pub id: Option<String>,
    pub title: String,
    pub view: SectionView,
}

/// What opening a detail section did
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DetailOpened {
    pub main_opened: bool,
    /// Id of the detail section to scroll to, if it exists
    pub scroll_to: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SectionBoard {
    sections: Vec<Section>,
}

impl SectionBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: Option<&str>, title: &str, marked_open: bool) {
        self.sections.push(Section {
            id: id.map(str::to_string),
            title: title.to_string(),
            view: initial_view(marked_open),
        });
    }

    pub fn by_id(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id.as_deref() == Some(id))
    }

    pub fn by_title(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title.trim() == title)
    }

    /// Toggle the section with `id`, returning its new view
    pub fn toggle(&mut self, id: &str) -> Option<SectionView> {
        let section = self
            .sections
            .iter_mut()
            .find(|s| s.id.as_deref() == Some(id))?;
        section.view = toggle(section.view.visibility);
        Some(section.view)
    }

    /// Open the detailed data section and the detail section for `date`
    pub fn open_detail(&mut self, date: &str) -> DetailOpened {
        let mut opened = DetailOpened::default();
        if let Some(main) = self
            .sections
            .iter_mut()
            .find(|s| s.title.trim() == DETAILED_DATA_TITLE)
        {
            main.view = SectionView::expanded();
            opened.main_opened = true;
        }

        let target_id = detail_section_id(date);
        if let Some(target) = self
            .sections
            .iter_mut()
            .find(|s| s.id.as_deref() == Some(target_id.as_str()))
        {
            target.view = SectionView::expanded();
            opened.scroll_to = Some(target_id);
        }
        opened
    }
}
