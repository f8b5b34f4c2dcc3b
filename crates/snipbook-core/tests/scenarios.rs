use std::fs;

use snipbook_core::resolver;
use snipbook_core::{
    parse, snippets_of, transform, BlockRunner, CapabilityRegistry, CapabilityResult, Config,
    Destination, Dispatched, ExecutableBlock, IndentMode, IndexLevels, KeyTable, Prompt, Result,
    SnipbookError, Snippet, SnippetRepository, SnippetSource, TransformContext,
};
use tempfile::TempDir;

struct Buffer {
    depth: Option<usize>,
    inserted: Vec<(String, IndentMode)>,
}

impl Buffer {
    fn at_depth(depth: Option<usize>) -> Self {
        Self {
            depth,
            inserted: Vec::new(),
        }
    }
}

impl Destination for Buffer {
    fn depth(&self) -> Option<usize> {
        self.depth
    }

    fn insert(&mut self, text: &str, indent: IndentMode) -> Result<()> {
        self.inserted.push((text.to_string(), indent));
        Ok(())
    }

    fn notify(&mut self, _message: &str) {}
}

struct NoPrompt;

impl Prompt for NoPrompt {
    fn choose(&mut self, _prompt: &str, _options: &[String]) -> Option<String> {
        None
    }
}

fn tagged(name: &str, tags: &[&str]) -> Snippet {
    Snippet::new(name, tags.iter().map(|t| t.to_string()).collect(), None)
}

#[test]
fn test_hello_world_insertion() {
    let mut repo = SnippetRepository::new(
        SnippetSource::Text("* Prog\n** Hello\nWorld\n".to_string()),
        &Config::default(),
        CapabilityRegistry::new(),
    );
    repo.select_category(Some("Prog"), &mut NoPrompt).unwrap();

    let mut buf = Buffer::at_depth(None);
    repo.insert_snippet(Some("Hello"), &mut NoPrompt, &mut buf)
        .unwrap();
    assert_eq!(buf.inserted, vec![("World".to_string(), IndentMode::Reindent)]);
}

#[test]
fn test_unregistered_function_snippet() {
    let mut repo = SnippetRepository::new(
        SnippetSource::Text("* Prog\n** ping :func:\n".to_string()),
        &Config::default(),
        CapabilityRegistry::new(),
    );
    repo.set_category("Prog");

    let mut buf = Buffer::at_depth(None);
    let result = repo.insert_snippet(Some("ping"), &mut NoPrompt, &mut buf);
    assert!(matches!(
        result,
        Err(SnipbookError::FunctionNotFound { ref name }) if name == "ping"
    ));
}

#[test]
fn test_switching_twice_serves_latest_category() {
    let source = "* A\n** a1\nx\n** a2\ny\n* B\n** b1\nz\n";
    let mut repo = SnippetRepository::new(
        SnippetSource::Text(source.to_string()),
        &Config::default(),
        CapabilityRegistry::new(),
    );

    repo.set_category("A");
    assert_eq!(repo.snippets().unwrap().len(), 2);
    repo.set_category("A");
    repo.set_category("B");

    let names: Vec<String> = repo
        .snippets()
        .unwrap()
        .iter()
        .map(|s| s.name.clone())
        .collect();
    assert_eq!(names, vec!["b1"]);
}

#[test]
fn test_document_order_and_membership() {
    let source = "\
* Web
** html
<html>
* Shell
** loop
for
*** nested detail
** if
if
* Web
** css
a {}
";
    let outline = parse(source);
    let shell = snippets_of(&outline, "Shell", IndexLevels::default());
    let names: Vec<&str> = shell.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["loop", "if"]);

    let web = snippets_of(&outline, "Web", IndexLevels::default());
    let names: Vec<&str> = web.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["html", "css"]);
}

#[test]
fn test_escape_substitution_depth_policy() {
    let snippet = Snippet::new("tree", Vec::new(), Some("\\*child\n".to_string()));
    let body = snippet.content.as_deref().unwrap();

    let on = TransformContext {
        depth: Some(3),
        respect_depth: true,
        template_active: false,
    };
    assert_eq!(transform(body, &snippet, &on).text, "***child");

    let off = TransformContext {
        respect_depth: false,
        ..on
    };
    assert_eq!(transform(body, &snippet, &off).text, "*child");
}

#[test]
fn test_depth_from_destination_via_config() {
    let mut config = Config::default();
    config.set("expand.respect_context_depth", "false").unwrap();
    let mut repo = SnippetRepository::new(
        SnippetSource::Text("* Org\n** tree\n\\*child\n".to_string()),
        &config,
        CapabilityRegistry::new(),
    );
    repo.set_category("Org");

    let mut buf = Buffer::at_depth(Some(3));
    repo.insert_snippet(Some("tree"), &mut NoPrompt, &mut buf)
        .unwrap();
    assert_eq!(buf.inserted[0].0, "*child");
}

#[test]
fn test_key_table_exclusions() {
    let table = KeyTable::build(&[
        tagged("f", &["func"]),
        tagged("r", &["results"]),
        tagged("i", &["indent_auto"]),
        tagged("mark", &["m"]),
    ]);
    assert_eq!(table.len(), 1);
    assert_eq!(table.get("m").map(|s| s.name.as_str()), Some("mark"));
}

#[test]
fn test_lookups_never_fail_hard() {
    let mut repo = SnippetRepository::new(
        SnippetSource::Text("* Prog\n** Hello\nWorld\n".to_string()),
        &Config::default(),
        CapabilityRegistry::new(),
    );
    repo.set_category("Prog");
    let snippets = repo.snippets().unwrap();
    assert!(resolver::exact(snippets, "Missing").is_none());
    assert!(resolver::prefix_match(snippets, "Missing", ":").is_none());
    assert!(resolver::prefix_match(snippets, "Hello", ":").is_none());
}

#[test]
fn test_parse_twice_is_identical() {
    let source = "intro\n* A :x:y:\nbody\n** B\n*** C :k:\nmore\n* D\n";
    assert_eq!(parse(source), parse(source));
}

#[test]
fn test_file_backed_repository_with_shell_style_block() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("snippets.org"),
        "* Tools\n** stamp :results:\n#+begin_src echo\nstamped\n#+end_src\n",
    )
    .unwrap();

    struct Echo;
    impl BlockRunner for Echo {
        fn run(&self, block: &ExecutableBlock) -> CapabilityResult {
            Ok(block.code.trim_end().to_string())
        }
    }

    let mut registry = CapabilityRegistry::new();
    registry.register_runner("echo", Echo);
    let mut repo = SnippetRepository::open(temp.path(), &Config::default(), registry).unwrap();
    repo.set_category("Tools");

    let mut buf = Buffer::at_depth(None);
    let out = repo
        .insert_snippet(Some("stamp"), &mut NoPrompt, &mut buf)
        .unwrap();
    assert_eq!(
        out,
        Dispatched::InsertedResult {
            text: "stamped".to_string()
        }
    );
}
