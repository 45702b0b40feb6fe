use super::*;
use crate::error::merge_error;
use crate::hooks::{FsUniqueNamer, ProjectRefresher};
use anyhow::anyhow;
use std::cell::RefCell;
use std::fs;
use std::rc::Rc;
use tempfile::TempDir;

#[derive(Clone, Default)]
struct RecordingRefresher {
    calls: Rc<RefCell<Vec<PathBuf>>>,
    fail: bool,
}

impl ProjectRefresher for RecordingRefresher {
    fn refresh_project(&self, project: &Path) -> Result<()> {
        self.calls.borrow_mut().push(project.to_path_buf());
        if self.fail {
            return Err(anyhow!("host unavailable"));
        }
        Ok(())
    }
}

fn hooks_with(refresher: RecordingRefresher) -> Hooks {
    Hooks {
        namer: Box::new(FsUniqueNamer),
        refresher: Box::new(refresher),
        project_extension: "csproj".to_string(),
    }
}

fn write(path: &Path, text: &str) {
    fs::write(path, text.as_bytes()).expect("write file");
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("read file")
}

fn config(fragment: PathBuf, fail_on_error: bool) -> MergeConfig {
    MergeConfig {
        fragment_path: fragment,
        fail_on_error,
    }
}

#[test]
fn applies_removal_and_addition_then_cleans_up() {
    let dir = TempDir::new().expect("temp dir");
    let target = dir.path().join("list.txt");
    let fragment = dir.path().join("list_postaction.txt");
    let intent = dir.path().join("list_postaction.md");
    write(&target, "a\nb\nc\n");
    write(&fragment, "a\n{--{\nb\n}--}\n{[{\nx\n}]}\n");
    write(&intent, "Replace b with x.");

    let mut ctx = RunContext::new(dir.path().to_path_buf());
    let outcome = apply_fragment(&mut ctx, &config(fragment.clone(), false), &Hooks::default())
        .expect("apply fragment");

    assert_eq!(
        outcome,
        MergeOutcome::Applied {
            target: target.clone(),
            refreshed: false
        }
    );
    assert_eq!(read(&target), "a\nx\nc\n");
    assert!(!fragment.exists());
    assert!(!intent.exists());
    assert!(ctx.failures().is_empty());
}

#[test]
fn missing_anchor_quarantines_and_leaves_target_untouched() {
    let dir = TempDir::new().expect("temp dir");
    let target = dir.path().join("list.txt");
    let fragment = dir.path().join("list_postaction.txt");
    write(&target, "a\r\nc\r\n");
    write(&fragment, "b\n{[{\nx\n}]}\n");
    write(&dir.path().join("list_postaction.md"), "Insert x after b.");
    let before = fs::read(&target).expect("read target");

    let mut ctx = RunContext::new(dir.path().to_path_buf());
    let outcome = apply_fragment(&mut ctx, &config(fragment.clone(), false), &Hooks::default())
        .expect("apply fragment");

    let record = match outcome {
        MergeOutcome::Quarantined(record) => record,
        other => panic!("expected quarantine, got {other:?}"),
    };
    assert_eq!(record.kind, MergeFailureKind::LineNotFound);
    assert_eq!(record.source_file_name, "list.txt");
    assert_eq!(record.fragment_file_name, "list_postaction.txt");
    assert_eq!(record.failed_file_name, "list_failedpostaction.txt");
    assert_eq!(record.intent, "Insert x after b.");
    assert!(record.description.contains("'b'"), "{}", record.description);
    assert_eq!(fs::read(&target).expect("read target"), before);
    assert_eq!(
        read(&dir.path().join("list_failedpostaction.txt")),
        "b\n{[{\nx\n}]}\n"
    );
    assert!(!fragment.exists());
    assert!(!dir.path().join("list_postaction.md").exists());
    assert_eq!(ctx.failures().len(), 1);
}

#[test]
fn strict_missing_anchor_raises_without_side_effects() {
    let dir = TempDir::new().expect("temp dir");
    let target = dir.path().join("list.txt");
    let fragment = dir.path().join("list_postaction.txt");
    write(&target, "a\nc\n");
    write(&fragment, "b\n{[{\nx\n}]}\n");

    let mut ctx = RunContext::new(dir.path().to_path_buf());
    let err = apply_fragment(&mut ctx, &config(fragment.clone(), true), &Hooks::default())
        .expect_err("strict failure");

    assert_eq!(
        merge_error(&err),
        Some(&MergeError::LineNotFound {
            line: "b".to_string(),
            target: target.clone()
        })
    );
    assert_eq!(read(&target), "a\nc\n");
    assert!(fragment.exists());
    assert!(ctx.failures().is_empty());
}

#[test]
fn strict_missing_target_raises_with_fragment_path() {
    let dir = TempDir::new().expect("temp dir");
    let fragment = dir.path().join("Missing_postaction.cs");
    write(&fragment, "{[{\nx\n}]}\n");

    let mut ctx = RunContext::new(dir.path().to_path_buf());
    let err = apply_fragment(&mut ctx, &config(fragment.clone(), true), &Hooks::default())
        .expect_err("strict failure");

    assert!(
        matches!(merge_error(&err), Some(MergeError::FileNotFound { .. })),
        "{err}"
    );
    assert!(
        err.to_string().contains(&fragment.display().to_string()),
        "{err}"
    );
    let entries = fs::read_dir(dir.path()).expect("read dir").count();
    assert_eq!(entries, 1, "only the fragment remains");
    assert!(fragment.exists());
}

#[test]
fn lenient_missing_target_quarantines_and_deletes_fragment() {
    let dir = TempDir::new().expect("temp dir");
    let fragment = dir.path().join("Missing_postaction.cs");
    write(&fragment, "{[{\nx\n}]}\n");

    let mut ctx = RunContext::new(dir.path().to_path_buf());
    let outcome = apply_fragment(&mut ctx, &config(fragment.clone(), false), &Hooks::default())
        .expect("apply fragment");

    let record = match outcome {
        MergeOutcome::Quarantined(record) => record,
        other => panic!("expected quarantine, got {other:?}"),
    };
    assert_eq!(record.kind, MergeFailureKind::FileNotFound);
    assert_eq!(record.source_file_name, "Missing.cs");
    assert!(dir.path().join("Missing_failedpostaction.cs").exists());
    assert!(!dir.path().join("Missing.cs").exists());
    assert!(!fragment.exists());
}

#[test]
fn global_fragment_without_sibling_is_quarantined() {
    let dir = TempDir::new().expect("temp dir");
    let fragment = dir.path().join("$*_gpostaction.csproj");
    write(&fragment, "<Project>\n");

    let mut ctx = RunContext::new(dir.path().to_path_buf());
    let outcome = apply_fragment(&mut ctx, &config(fragment.clone(), false), &Hooks::default())
        .expect("apply fragment");

    let record = match outcome {
        MergeOutcome::Quarantined(record) => record,
        other => panic!("expected quarantine, got {other:?}"),
    };
    assert_eq!(record.source_file_name, "*.csproj");
    assert_eq!(record.failed_file_name, "$*_gfailedpostaction.csproj");
}

#[test]
fn project_files_trigger_refresh() {
    let dir = TempDir::new().expect("temp dir");
    let project = dir.path().join("App.csproj");
    write(&project, "<Project>\n</Project>\n");
    let fragment = dir.path().join("$*_gpostaction.csproj");
    write(&fragment, "<Project>\n{[{\n  <Item />\n}]}\n");

    let refresher = RecordingRefresher::default();
    let hooks = hooks_with(refresher.clone());
    let mut ctx = RunContext::new(dir.path().to_path_buf());
    let outcome =
        apply_fragment(&mut ctx, &config(fragment, false), &hooks).expect("apply fragment");

    assert_eq!(
        outcome,
        MergeOutcome::Applied {
            target: project.clone(),
            refreshed: true
        }
    );
    assert_eq!(read(&project), "<Project>\n  <Item />\n</Project>\n");
    assert_eq!(*refresher.calls.borrow(), vec![project]);
}

#[test]
fn other_files_do_not_trigger_refresh() {
    let dir = TempDir::new().expect("temp dir");
    write(&dir.path().join("App.cs"), "class App {}\n");
    let fragment = dir.path().join("App_postaction.cs");
    write(&fragment, "class App {}\n{[{\n// added\n}]}\n");

    let refresher = RecordingRefresher::default();
    let hooks = hooks_with(refresher.clone());
    let mut ctx = RunContext::new(dir.path().to_path_buf());
    apply_fragment(&mut ctx, &config(fragment, false), &hooks).expect("apply fragment");

    assert!(refresher.calls.borrow().is_empty());
}

#[test]
fn refresh_failure_keeps_the_committed_merge() {
    let dir = TempDir::new().expect("temp dir");
    let project = dir.path().join("App.csproj");
    write(&project, "<Project>\n");
    let fragment = dir.path().join("App_postaction.csproj");
    write(&fragment, "<Project>\n{[{\n<Item />\n}]}\n");

    let refresher = RecordingRefresher {
        fail: true,
        ..RecordingRefresher::default()
    };
    let hooks = hooks_with(refresher);
    let mut ctx = RunContext::new(dir.path().to_path_buf());
    let outcome =
        apply_fragment(&mut ctx, &config(fragment.clone(), false), &hooks).expect("apply");

    assert_eq!(
        outcome,
        MergeOutcome::Applied {
            target: project.clone(),
            refreshed: false
        }
    );
    assert_eq!(read(&project), "<Project>\n<Item />\n");
    assert!(!fragment.exists());
}

#[cfg(unix)]
#[test]
fn read_only_target_is_unlocked_before_commit() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().expect("temp dir");
    let target = dir.path().join("App.xaml");
    write(&target, "<Grid>\n");
    fs::set_permissions(&target, fs::Permissions::from_mode(0o444)).expect("lock");
    let fragment = dir.path().join("App_postaction.xaml");
    write(&fragment, "<Grid>\n<!--{[{-->\n<Button />\n<!--}]}-->\n");

    let mut ctx = RunContext::new(dir.path().to_path_buf());
    apply_fragment(&mut ctx, &config(fragment, false), &Hooks::default()).expect("apply");

    assert_eq!(read(&target), "<Grid>\n<Button />\n");
    let mode = fs::metadata(&target).expect("metadata").permissions().mode();
    assert_eq!(mode & 0o200, 0o200);
}
