use super::SourceHeuristic;
use crate::detection::context::DetectionContext;
use crate::tokens::{Ecosystem, TokenSource};
use anyhow::Result;
use tracing::{debug, warn};

const THEME_CANDIDATES: &[&str] = &[
    "src/theme.ts",
    "src/theme.js",
    "src/theme.tsx",
    "src/theme.jsx",
    "src/theme/index.ts",
    "src/theme/index.js",
    "theme.ts",
    "theme.js",
];

const MARKED_CONFIDENCE: f64 = 0.9;
const UNMARKED_CONFIDENCE: f64 = 0.6;

/// Component-library theme files, gated on a package dependency.
///
/// A theme file mentioning the library's theme constructor scores higher than
/// one that merely sits at a conventional location.
pub struct ComponentThemeHeuristic {
    ecosystem: Ecosystem,
    package: &'static str,
    constructor: &'static str,
}

impl ComponentThemeHeuristic {
    pub fn mui() -> Self {
        Self {
            ecosystem: Ecosystem::Mui,
            package: "@mui/material",
            constructor: "createTheme",
        }
    }

    pub fn chakra() -> Self {
        Self {
            ecosystem: Ecosystem::Chakra,
            package: "@chakra-ui/react",
            constructor: "extendTheme",
        }
    }
}

impl SourceHeuristic for ComponentThemeHeuristic {
    fn ecosystem(&self) -> Ecosystem {
        self.ecosystem
    }

    fn detect(&self, ctx: &DetectionContext) -> Result<Vec<TokenSource>> {
        let mut sources = Vec::new();

        for package_dir in ctx.package_roots() {
            let deps = match ctx.dependencies(&package_dir) {
                Ok(deps) => deps,
                Err(e) => {
                    warn!(dir = %package_dir.display(), error = %e, "Unreadable package.json");
                    continue;
                }
            };
            if !deps.contains(self.package) {
                continue;
            }

            let Some(theme) = ctx.first_existing(&package_dir, THEME_CANDIDATES) else {
                debug!(
                    dir = %package_dir.display(),
                    package = self.package,
                    "Dependency present but no theme file"
                );
                continue;
            };

            // An unreadable theme still counts, just without the constructor bonus
            let marked = match ctx.read_bounded(&theme) {
                Ok(text) => text.is_some_and(|text| text.contains(self.constructor)),
                Err(e) => {
                    warn!(path = %theme.display(), error = %e, "Failed to read theme file");
                    false
                }
            };
            let confidence = if marked {
                MARKED_CONFIDENCE
            } else {
                UNMARKED_CONFIDENCE
            };

            sources.push(
                TokenSource::new(
                    self.ecosystem,
                    theme,
                    confidence,
                    format!("{} theme", self.ecosystem.name()),
                )
                .with_metadata("package", self.package)
                .with_metadata("constructor", marked),
            );
        }

        Ok(sources)
    }
}
