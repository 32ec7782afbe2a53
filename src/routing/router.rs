//! Route lookup.
//!
//! # Responsibilities
//! - Store the static route table
//! - Resolve a path to a view, a redirect, or an explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan in declaration order, first match wins
//! - Device classification only happens for the redirect route
//! - Explicit NotFound rather than silent default

use crate::config::RouteTableKind;
use crate::routing::device::{classify, ClientHints, DeviceClass};
use crate::routing::matcher::{Params, PathPattern};

/// The two parallel view subtrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewSet {
    Desktop,
    Mobile,
}

impl ViewSet {
    pub fn for_device(device: DeviceClass) -> Self {
        match device {
            DeviceClass::Mobile => ViewSet::Mobile,
            DeviceClass::Desktop => ViewSet::Desktop,
        }
    }

    /// Entry path of the subtree.
    pub fn root_path(&self) -> &'static str {
        match self {
            ViewSet::Desktop => "/pc",
            ViewSet::Mobile => "/m",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    StrategyList,
    StrategyCreate,
    StrategyDetail,
    MobileHome,
    MobileRecord,
    MobileHistory,
    MobileStrategyCreate,
    MobileStrategyDetail,
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            View::StrategyList => "StrategyList",
            View::StrategyCreate => "StrategyCreate",
            View::StrategyDetail => "StrategyDetail",
            View::MobileHome => "MobileHome",
            View::MobileRecord => "MobileRecord",
            View::MobileHistory => "MobileHistory",
            View::MobileStrategyCreate => "MobileStrategyCreate",
            View::MobileStrategyDetail => "MobileStrategyDetail",
        }
    }

    pub fn view_set(&self) -> ViewSet {
        match self {
            View::StrategyList | View::StrategyCreate | View::StrategyDetail => ViewSet::Desktop,
            _ => ViewSet::Mobile,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    View(View),
    /// Redirect to the root of the view set chosen by device class.
    RedirectByDevice,
}

#[derive(Debug, Clone)]
pub struct Route {
    pub name: &'static str,
    pub pattern: PathPattern,
    pub target: RouteTarget,
}

impl Route {
    fn view(pattern: &'static str, view: View) -> Self {
        Self {
            name: view.name(),
            pattern: PathPattern::new(pattern),
            target: RouteTarget::View(view),
        }
    }
}

/// Outcome of resolving a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Render { view: View, params: Params },
    Redirect { location: &'static str },
    NotFound,
}

/// Static route table.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Desktop and mobile subtrees with a device redirect at `/`.
    pub fn extended() -> Self {
        Self {
            routes: vec![
                Route {
                    name: "Home",
                    pattern: PathPattern::new("/"),
                    target: RouteTarget::RedirectByDevice,
                },
                Route::view("/pc", View::StrategyList),
                Route::view("/create", View::StrategyCreate),
                Route::view("/strategy/:id", View::StrategyDetail),
                Route::view("/m", View::MobileHome),
                Route::view("/m/record", View::MobileRecord),
                Route::view("/m/history", View::MobileHistory),
                Route::view("/m/create", View::MobileStrategyCreate),
                Route::view("/m/strategy/:id", View::MobileStrategyDetail),
            ],
        }
    }

    /// Desktop views only, list at `/`.
    pub fn reduced() -> Self {
        Self {
            routes: vec![
                Route::view("/", View::StrategyList),
                Route::view("/create", View::StrategyCreate),
                Route::view("/strategy/:id", View::StrategyDetail),
            ],
        }
    }

    pub fn from_kind(kind: RouteTableKind) -> Self {
        match kind {
            RouteTableKind::Extended => Self::extended(),
            RouteTableKind::Reduced => Self::reduced(),
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn resolve(&self, path: &str, hints: &ClientHints) -> Resolution {
        for route in &self.routes {
            let Some(params) = route.pattern.matches(path) else {
                continue;
            };
            return match route.target {
                RouteTarget::View(view) => Resolution::Render { view, params },
                RouteTarget::RedirectByDevice => {
                    let set = ViewSet::for_device(classify(hints));
                    tracing::debug!(path = %path, view_set = ?set, "Device redirect");
                    Resolution::Redirect {
                        location: set.root_path(),
                    }
                }
            };
        }
        Resolution::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mobile() -> ClientHints {
        ClientHints::new(Some("Mozilla/5.0 (Linux; Android 14; Pixel 8)"), None)
    }

    fn desktop() -> ClientHints {
        ClientHints::new(Some("Mozilla/5.0 (X11; Linux x86_64) Firefox/128.0"), Some(1440))
    }

    #[test]
    fn test_root_redirects_by_device() {
        let table = RouteTable::extended();
        assert_eq!(table.resolve("/", &mobile()), Resolution::Redirect { location: "/m" });
        assert_eq!(table.resolve("/", &desktop()), Resolution::Redirect { location: "/pc" });

        let narrow = ClientHints::new(Some("Mozilla/5.0 (X11; Linux x86_64)"), Some(500));
        assert_eq!(table.resolve("/", &narrow), Resolution::Redirect { location: "/m" });
    }

    #[test]
    fn test_extended_views() {
        let table = RouteTable::extended();
        let cases = [
            ("/pc", View::StrategyList),
            ("/create", View::StrategyCreate),
            ("/m", View::MobileHome),
            ("/m/record", View::MobileRecord),
            ("/m/history", View::MobileHistory),
            ("/m/create", View::MobileStrategyCreate),
        ];
        for (path, view) in cases {
            assert_eq!(
                table.resolve(path, &mobile()),
                Resolution::Render { view, params: vec![] },
                "{}",
                path
            );
        }
    }

    #[test]
    fn test_detail_params_pass_through() {
        let table = RouteTable::extended();
        assert_eq!(
            table.resolve("/m/strategy/abc", &desktop()),
            Resolution::Render {
                view: View::MobileStrategyDetail,
                params: vec![("id".into(), "abc".into())]
            }
        );
        assert_eq!(
            table.resolve("/strategy/7", &mobile()),
            Resolution::Render {
                view: View::StrategyDetail,
                params: vec![("id".into(), "7".into())]
            }
        );
    }

    #[test]
    fn test_reduced_table() {
        let table = RouteTable::reduced();
        assert_eq!(table.routes().len(), 3);
        assert_eq!(
            table.resolve("/", &mobile()),
            Resolution::Render { view: View::StrategyList, params: vec![] }
        );
        assert_eq!(table.resolve("/m", &mobile()), Resolution::NotFound);
    }

    #[test]
    fn test_unknown_path() {
        assert_eq!(RouteTable::extended().resolve("/nope", &desktop()), Resolution::NotFound);
    }

    #[test]
    fn test_view_sets() {
        assert_eq!(View::StrategyDetail.view_set(), ViewSet::Desktop);
        assert_eq!(View::MobileRecord.view_set(), ViewSet::Mobile);
        assert_eq!(ViewSet::for_device(DeviceClass::Mobile).root_path(), "/m");
    }
}
