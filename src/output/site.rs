//! Docusaurus site emission.
//!
//! Lays the written documents out as a Docusaurus project under
//! `<site>/website`: docs with frontmatter, a sidebar mirroring the source
//! directories, the TypeScript config files and `package.json`. Installing
//! npm dependencies is left to the user.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tracing::{debug, info};

use super::assembler::WrittenDoc;
use crate::constants::output::{DEPENDENCY_FILE, DOC_SUFFIX, OVERVIEW_FILE, SITE_DIR_SUFFIX};
use crate::types::{DocError, Result};

const INTRO_ID: &str = "intro";
const DEPENDENCIES_ID: &str = "dependencies";
const SIDEBAR_ID: &str = "docsSidebar";
const DOCUSAURUS_VERSION: &str = "3.0.1";

/// Default site root: `<output>-docusaurus` next to the output root
pub fn default_site_dir(output_root: &Path) -> PathBuf {
    let name = output_root
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("docs");
    output_root.with_file_name(format!("{}{}", name, SITE_DIR_SUFFIX))
}

pub struct SiteGenerator {
    site_root: PathBuf,
    project_name: String,
    show_hidden: bool,
}

#[derive(Debug, Clone)]
pub struct SiteReport {
    pub site_root: PathBuf,
    pub website: PathBuf,
    pub pages: usize,
}

/// A source-file doc placed in the site
#[derive(Debug, Clone, PartialEq, Eq)]
struct Page {
    /// Path under `website/docs`
    path: String,
    /// Frontmatter id, unique within its directory
    id: String,
    title: String,
}

impl Page {
    fn new(path: &str) -> Self {
        let name = path.rsplit('/').next().unwrap_or(path);
        let title = name.strip_suffix(DOC_SUFFIX).unwrap_or(name).to_string();
        Self {
            path: path.to_string(),
            id: safe_doc_id(&title),
            title,
        }
    }

    fn dir(&self) -> &str {
        self.path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
    }

    /// Id as Docusaurus resolves it: directory prefix plus frontmatter id
    fn full_id(&self) -> String {
        match self.dir() {
            "" => self.id.clone(),
            dir => format!("{}/{}", dir, self.id),
        }
    }
}

impl SiteGenerator {
    pub fn new(site_root: impl Into<PathBuf>, project_name: impl Into<String>) -> Self {
        Self {
            site_root: site_root.into(),
            project_name: project_name.into(),
            show_hidden: false,
        }
    }

    pub fn with_show_hidden(mut self, show_hidden: bool) -> Self {
        self.show_hidden = show_hidden;
        self
    }

    pub fn generate(&self, documents: &[WrittenDoc]) -> Result<SiteReport> {
        let website = self.site_root.join("website");
        if website.exists() {
            debug!(path = %website.display(), "Replacing previous site");
            fs::remove_dir_all(&website).map_err(site_error)?;
        }
        let docs_dir = website.join("docs");
        fs::create_dir_all(&docs_dir).map_err(site_error)?;
        fs::create_dir_all(website.join("static/img")).map_err(site_error)?;

        let mut pages = Vec::new();
        let mut has_dependencies = false;
        for doc in documents {
            match doc.path.as_str() {
                OVERVIEW_FILE => write_file(&docs_dir.join("intro.md"), &intro(&doc.content))?,
                DEPENDENCY_FILE => {
                    has_dependencies = true;
                    write_file(
                        &docs_dir.join(DEPENDENCY_FILE),
                        &frontmatter(DEPENDENCIES_ID, "Dependency Graph", &doc.content),
                    )?;
                }
                path if self.include(path) => {
                    let page = Page::new(path);
                    write_file(
                        &docs_dir.join(&page.path),
                        &frontmatter(&page.id, &page.title, &doc.content),
                    )?;
                    pages.push(page);
                }
                path => debug!(path, "Hidden doc left out of the site"),
            }
        }

        let sidebar = sidebar_items(&pages, has_dependencies);
        write_file(&website.join("sidebars.ts"), &sidebars_ts(&sidebar)?)?;
        write_file(
            &website.join("docusaurus.config.ts"),
            &docusaurus_config(&self.project_name),
        )?;
        write_file(&website.join("tsconfig.json"), TSCONFIG)?;
        write_file(&website.join("src/css/custom.css"), CUSTOM_CSS)?;
        write_file(
            &website.join("package.json"),
            &serde_json::to_string_pretty(&package_json(&self.project_name))?,
        )?;
        write_file(
            &self.site_root.join("README.md"),
            &site_readme(&self.project_name),
        )?;

        info!(
            site = %website.display(),
            pages = pages.len(),
            "Docusaurus site generated"
        );

        Ok(SiteReport {
            site_root: self.site_root.clone(),
            website,
            pages: pages.len(),
        })
    }

    /// Hidden and `_`-prefixed path components are excluded unless enabled
    fn include(&self, path: &str) -> bool {
        self.show_hidden
            || !path
                .split('/')
                .any(|part| part.starts_with('.') || part.starts_with('_'))
    }
}

fn site_error(err: std::io::Error) -> DocError {
    DocError::Site(err.to_string())
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(site_error)?;
    }
    fs::write(path, content).map_err(site_error)
}

/// `src/a.py` → `src-a-py`; a valid Docusaurus doc id
fn safe_doc_id(name: &str) -> String {
    let mut id = String::with_capacity(name.len());
    for c in name.chars() {
        let c = if c.is_alphanumeric() || c == '_' { c } else { '-' };
        if c == '-' && id.ends_with('-') {
            continue;
        }
        id.push(c);
    }
    let id = id.trim_matches('-');
    if id.is_empty() {
        "doc".to_string()
    } else {
        id.to_string()
    }
}

/// YAML-safe single-quoted scalar
fn yaml_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn frontmatter(id: &str, title: &str, content: &str) -> String {
    format!(
        "---\nid: {}\ntitle: {}\n---\n\n{}",
        id,
        yaml_quote(title),
        content
    )
}

fn intro(content: &str) -> String {
    format!(
        "---\nid: {}\nsidebar_position: 1\nslug: /\ntitle: Introduction\n---\n\n{}",
        INTRO_ID, content
    )
}

#[derive(Default)]
struct Category<'a> {
    pages: Vec<&'a Page>,
    children: BTreeMap<&'a str, Category<'a>>,
}

fn sidebar_items(pages: &[Page], has_dependencies: bool) -> Vec<Value> {
    let mut root = Category::default();
    for page in pages {
        let mut node = &mut root;
        for part in page.dir().split('/').filter(|p| !p.is_empty()) {
            node = node.children.entry(part).or_default();
        }
        node.pages.push(page);
    }

    let mut items = vec![json!({ "type": "doc", "id": INTRO_ID, "label": "Introduction" })];
    if has_dependencies {
        items.push(json!({ "type": "doc", "id": DEPENDENCIES_ID, "label": "Dependency Graph" }));
    }
    items.extend(category_items(&root));
    items
}

/// Subcategories first, then the pages of this directory
fn category_items(category: &Category<'_>) -> Vec<Value> {
    let mut items: Vec<Value> = category
        .children
        .iter()
        .map(|(name, child)| {
            json!({
                "type": "category",
                "label": name,
                "items": category_items(child),
            })
        })
        .collect();
    items.extend(category.pages.iter().map(|page| {
        json!({ "type": "doc", "id": page.full_id(), "label": page.title })
    }));
    items
}

fn sidebars_ts(items: &[Value]) -> Result<String> {
    Ok(format!(
        "import type {{SidebarsConfig}} from '@docusaurus/plugin-content-docs';\n\n\
         const sidebars: SidebarsConfig = {{\n  {}: {},\n}};\n\n\
         export default sidebars;\n",
        SIDEBAR_ID,
        serde_json::to_string_pretty(items)?
    ))
}

/// Escape for a single-quoted TypeScript string
fn ts_string(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn docusaurus_config(project_name: &str) -> String {
    format!(
        r#"import {{themes as prismThemes}} from 'prism-react-renderer';
import type {{Config}} from '@docusaurus/types';
import type * as Preset from '@docusaurus/preset-classic';

const config: Config = {{
  title: {title},
  tagline: {tagline},
  url: 'https://example.com',
  baseUrl: '/',
  projectName: {project},

  onBrokenLinks: 'warn',
  onBrokenMarkdownLinks: 'warn',

  i18n: {{
    defaultLocale: 'en',
    locales: ['en'],
  }},

  presets: [
    [
      'classic',
      {{
        docs: {{
          sidebarPath: './sidebars.ts',
          routeBasePath: '/',
        }},
        blog: false,
        theme: {{
          customCss: './src/css/custom.css',
        }},
      }} satisfies Preset.Options,
    ],
  ],

  themeConfig: {{
    navbar: {{
      title: {project},
      items: [
        {{
          type: 'docSidebar',
          sidebarId: '{sidebar}',
          position: 'left',
          label: 'Documentation',
        }},
      ],
    }},
    footer: {{
      style: 'dark',
      copyright: 'Generated by {generator}',
    }},
    prism: {{
      theme: prismThemes.github,
      darkTheme: prismThemes.dracula,
      additionalLanguages: ['python', 'java', 'rust', 'go', 'php'],
    }},
  }} satisfies Preset.ThemeConfig,
}};

export default config;
"#,
        title = ts_string(&format!("{} Documentation", project_name)),
        tagline = ts_string(&format!("Generated documentation for {}", project_name)),
        project = ts_string(project_name),
        sidebar = SIDEBAR_ID,
        generator = env!("CARGO_PKG_NAME"),
    )
}

/// npm package names are lowercase without spaces
fn package_name(project_name: &str) -> String {
    let slug: String = project_name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect();
    format!("{}-docs", slug.trim_matches('-'))
}

fn package_json(project_name: &str) -> Value {
    json!({
        "name": package_name(project_name),
        "version": "0.0.0",
        "private": true,
        "scripts": {
            "docusaurus": "docusaurus",
            "start": "docusaurus start",
            "build": "docusaurus build",
            "serve": "docusaurus serve",
            "clear": "docusaurus clear"
        },
        "dependencies": {
            "@docusaurus/core": DOCUSAURUS_VERSION,
            "@docusaurus/preset-classic": DOCUSAURUS_VERSION,
            "@mdx-js/react": "^3.0.0",
            "clsx": "^2.0.0",
            "prism-react-renderer": "^2.3.0",
            "react": "^18.0.0",
            "react-dom": "^18.0.0"
        },
        "devDependencies": {
            "@docusaurus/module-type-aliases": DOCUSAURUS_VERSION,
            "@docusaurus/tsconfig": DOCUSAURUS_VERSION,
            "@docusaurus/types": DOCUSAURUS_VERSION,
            "typescript": "~5.2.2"
        },
        "browserslist": {
            "production": [">0.5%", "not dead", "not op_mini all"],
            "development": [
                "last 1 chrome version",
                "last 1 firefox version",
                "last 1 safari version"
            ]
        },
        "engines": { "node": ">=18.0" }
    })
}

const TSCONFIG: &str = r#"{
  "extends": "@docusaurus/tsconfig",
  "compilerOptions": {
    "baseUrl": "."
  },
  "include": ["src/", "docs/", "docusaurus.config.ts", "sidebars.ts"]
}
"#;

const CUSTOM_CSS: &str = r#":root {
  --ifm-color-primary: #2e8555;
  --ifm-color-primary-dark: #29784c;
  --ifm-color-primary-darker: #277148;
  --ifm-color-primary-darkest: #205d3b;
  --ifm-color-primary-light: #33925d;
  --ifm-color-primary-lighter: #359962;
  --ifm-color-primary-lightest: #3cad6e;
  --ifm-code-font-size: 95%;
}

[data-theme='dark'] {
  --ifm-color-primary: #25c2a0;
}
"#;

fn site_readme(project_name: &str) -> String {
    format!(
        "# {name} - Docusaurus Documentation\n\n\
         Generated documentation site for {name}.\n\n\
         ## Quick start\n\n\
         ```bash\ncd website\nnpm install\nnpm start\n```\n\n\
         The site is served at http://localhost:3000.\n\n\
         ## Production build\n\n\
         ```bash\nnpm run build\n```\n\n\
         The static site is written to `website/build/`.\n\n\
         ## Layout\n\n\
         - `website/docs/` generated markdown\n\
         - `website/sidebars.ts` navigation\n\
         - `website/docusaurus.config.ts` site configuration\n\n\
         Regenerate with `{generator} generate <repo> --site`; local edits under `website/` are replaced.\n",
        name = project_name,
        generator = env!("CARGO_PKG_NAME"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn docs() -> Vec<WrittenDoc> {
        [
            ("main.py.md", "# main.py"),
            ("pkg/util.py.md", "# util"),
            ("pkg/__init__.py.md", "# init"),
            (".github/setup.py.md", "# hidden"),
            (OVERVIEW_FILE, "# demo\n\n[main](main.py.md)"),
            (DEPENDENCY_FILE, "# Dependency Graph\n"),
        ]
        .into_iter()
        .map(|(path, content)| WrittenDoc {
            path: path.to_string(),
            content: content.to_string(),
        })
        .collect()
    }

    #[test]
    fn test_default_site_dir() {
        assert_eq!(
            default_site_dir(Path::new("/tmp/demo-docs-1a2b3c4d")),
            PathBuf::from("/tmp/demo-docs-1a2b3c4d-docusaurus")
        );
    }

    #[test]
    fn test_safe_doc_id() {
        assert_eq!(safe_doc_id("util.py"), "util-py");
        assert_eq!(safe_doc_id("__init__.py"), "__init__-py");
        assert_eq!(safe_doc_id("a..b c"), "a-b-c");
        assert_eq!(safe_doc_id("..."), "doc");
    }

    #[test]
    fn test_generate_layout() {
        let dir = TempDir::new().unwrap();
        let report = SiteGenerator::new(dir.path(), "demo")
            .generate(&docs())
            .unwrap();
        let web = dir.path().join("website");

        assert_eq!(report.pages, 2);
        for file in [
            "docs/intro.md",
            "docs/dependencies.md",
            "docs/main.py.md",
            "docs/pkg/util.py.md",
            "sidebars.ts",
            "docusaurus.config.ts",
            "tsconfig.json",
            "src/css/custom.css",
            "package.json",
        ] {
            assert!(web.join(file).is_file(), "missing {}", file);
        }
        assert!(dir.path().join("README.md").is_file());
        assert!(!web.join("docs/pkg/__init__.py.md").exists());
        assert!(!web.join("docs/.github").exists());

        let util = fs::read_to_string(web.join("docs/pkg/util.py.md")).unwrap();
        assert!(util.starts_with("---\nid: util-py\ntitle: 'util.py'\n---\n\n# util"));

        let intro = fs::read_to_string(web.join("docs/intro.md")).unwrap();
        assert!(intro.contains("slug: /"));
        assert!(intro.ends_with("[main](main.py.md)"));
    }

    #[test]
    fn test_sidebar_mirrors_directories() {
        let dir = TempDir::new().unwrap();
        SiteGenerator::new(dir.path(), "demo")
            .generate(&docs())
            .unwrap();
        let sidebar = fs::read_to_string(dir.path().join("website/sidebars.ts")).unwrap();

        assert!(sidebar.contains("docsSidebar"));
        assert!(sidebar.contains("\"id\": \"intro\""));
        assert!(sidebar.contains("\"id\": \"dependencies\""));
        assert!(sidebar.contains("\"label\": \"pkg\""));
        assert!(sidebar.contains("\"id\": \"pkg/util-py\""));
        assert!(sidebar.contains("\"id\": \"main-py\""));
        assert!(!sidebar.contains("__init__"));
    }

    #[test]
    fn test_show_hidden_keeps_underscore_docs() {
        let dir = TempDir::new().unwrap();
        let report = SiteGenerator::new(dir.path(), "demo")
            .with_show_hidden(true)
            .generate(&docs())
            .unwrap();
        assert_eq!(report.pages, 4);
        assert!(dir.path().join("website/docs/pkg/__init__.py.md").is_file());
    }

    #[test]
    fn test_regenerate_replaces_stale_pages() {
        let dir = TempDir::new().unwrap();
        let stale = dir.path().join("website/docs/old.py.md");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "old").unwrap();

        SiteGenerator::new(dir.path(), "demo")
            .generate(&docs())
            .unwrap();
        assert!(!stale.exists());
    }

    #[test]
    fn test_package_json() {
        let pkg = package_json("My Project");
        assert_eq!(pkg["name"], "my-project-docs");
        assert_eq!(pkg["dependencies"]["@docusaurus/core"], DOCUSAURUS_VERSION);
        assert_eq!(ts_string("it's"), "'it\\'s'");
    }
}
