//! The navigation bar: a row of links at the top of the page on large
//! screens and a fixed tab bar at the bottom on small screens.

use maud::{Markup, html};

use crate::endpoints;

/// The pages shown in the navigation bar, in display order.
const PAGES: [(&str, &str); 5] = [
    (endpoints::DASHBOARD_VIEW, "Dashboard"),
    (endpoints::EXPENSES_VIEW, "Expenses"),
    (endpoints::BUDGETS_VIEW, "Budgets"),
    (endpoints::REPORTS_VIEW, "Reports"),
    (endpoints::EXPORT_VIEW, "Export"),
];

/// A link in the navigation bar.
///
/// Only one link should have `is_current` set at any one time.
#[derive(Clone, Copy)]
struct Link {
    url: &'static str,
    title: &'static str,
    is_current: bool,
}

impl Link {
    fn top_bar_style(self) -> &'static str {
        if self.is_current {
            "block py-2 px-3 rounded-sm text-white bg-blue-700 \
            lg:bg-transparent lg:text-blue-700 lg:p-0 lg:dark:text-blue-500"
        } else {
            "block py-2 px-3 rounded-sm text-gray-900 hover:bg-gray-100 \
            lg:hover:bg-transparent lg:hover:text-blue-700 lg:p-0 \
            dark:text-white dark:hover:bg-gray-700 lg:dark:hover:text-blue-500"
        }
    }

    fn tab_bar_style(self) -> &'static str {
        if self.is_current {
            "flex justify-center rounded-lg px-2 py-2 text-xs font-semibold \
            bg-blue-50 text-blue-700 dark:bg-blue-900/30 dark:text-blue-200"
        } else {
            "flex justify-center rounded-lg px-2 py-2 text-xs font-semibold \
            text-gray-600 hover:text-blue-700 dark:text-gray-300 dark:hover:text-blue-200"
        }
    }
}

pub struct NavBar {
    links: Vec<Link>,
}

impl NavBar {
    /// Get the navigation bar with the link for `active_endpoint`, if any,
    /// marked as the current page.
    pub fn new(active_endpoint: &str) -> NavBar {
        let links = PAGES
            .into_iter()
            .map(|(url, title)| Link {
                url,
                title,
                is_current: active_endpoint == url,
            })
            .collect();

        NavBar { links }
    }

    pub fn into_html(self) -> Markup {
        html!(
            nav class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div class="max-w-screen-xl flex items-center justify-between mx-auto p-4"
                {
                    a
                        href=(endpoints::ROOT)
                        class="text-2xl font-semibold whitespace-nowrap dark:text-white"
                    {
                        "Expense Tracker"
                    }

                    ul class="hidden lg:flex lg:space-x-8 font-medium"
                    {
                        @for link in &self.links {
                            li
                            {
                                a
                                    href=(link.url)
                                    class=(link.top_bar_style())
                                    aria-current=[link.is_current.then_some("page")]
                                {
                                    (link.title)
                                }
                            }
                        }
                    }
                }
            }

            nav class="fixed inset-x-0 bottom-0 z-40 lg:hidden"
            {
                ul
                    class="grid grid-cols-5 gap-1 mx-4 mb-4 p-2 rounded-xl border
                    border-gray-200 bg-white/95 shadow-lg
                    dark:border-gray-700 dark:bg-gray-900/95"
                    aria-label="Primary"
                {
                    @for link in &self.links {
                        li
                        {
                            a
                                href=(link.url)
                                class=(link.tab_bar_style())
                                aria-current=[link.is_current.then_some("page")]
                            {
                                (link.title)
                            }
                        }
                    }
                }
            }
        )
    }
}

#[cfg(test)]
mod nav_bar_tests {
    use scraper::{Html, Selector};

    use crate::{endpoints, navigation::NavBar};

    #[test]
    fn marks_only_the_active_page() {
        let pages = [
            endpoints::DASHBOARD_VIEW,
            endpoints::EXPENSES_VIEW,
            endpoints::BUDGETS_VIEW,
            endpoints::REPORTS_VIEW,
            endpoints::EXPORT_VIEW,
        ];

        for active in pages {
            let nav_bar = NavBar::new(active);

            for link in &nav_bar.links {
                assert_eq!(
                    link.is_current,
                    link.url == active,
                    "link {} with active page {active}",
                    link.url
                );
            }
        }
    }

    #[test]
    fn no_link_active_for_other_endpoints() {
        for endpoint in [
            endpoints::ROOT,
            endpoints::NEW_EXPENSE_VIEW,
            endpoints::INTERNAL_ERROR_VIEW,
            endpoints::POST_EXPENSE,
            endpoints::EXPORT_API,
        ] {
            let nav_bar = NavBar::new(endpoint);

            assert!(
                nav_bar.links.iter().all(|link| !link.is_current),
                "no link should be active for {endpoint}"
            );
        }
    }

    #[test]
    fn renders_current_page_in_both_bars() {
        let html = Html::parse_fragment(
            &NavBar::new(endpoints::REPORTS_VIEW)
                .into_html()
                .into_string(),
        );

        let current: Vec<_> = html
            .select(&Selector::parse("a[aria-current=page]").unwrap())
            .filter_map(|link| link.value().attr("href"))
            .collect();
        assert_eq!(current, vec![endpoints::REPORTS_VIEW, endpoints::REPORTS_VIEW]);
    }
}
