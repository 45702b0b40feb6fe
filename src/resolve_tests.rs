use super::*;
use std::path::Path;
use tempfile::TempDir;

fn touch(path: &Path) {
    std::fs::write(path, b"").expect("write file");
}

#[test]
fn scoped_fragment_strips_marker() {
    let target = scoped_target(Path::new("/out/Views/MainPage_postaction.xaml"));
    assert_eq!(target, Path::new("/out/Views/MainPage.xaml"));
}

#[test]
fn project_scoped_fragment_strips_scope_and_marker() {
    let target = scoped_target(Path::new("/out/Package$App_gpostaction.appxmanifest"));
    assert_eq!(target, Path::new("/out/Package.appxmanifest"));
}

#[test]
fn scoped_resolution_does_not_touch_the_file_system() {
    let resolved = resolve_target(Path::new("/does/not/exist/App_postaction.cs"))
        .expect("resolve scoped");
    assert_eq!(resolved, Some(PathBuf::from("/does/not/exist/App.cs")));
}

#[test]
fn convention_is_chosen_by_name_prefix() {
    assert_eq!(
        convention(Path::new("dir/$*_gpostaction.csproj")),
        FragmentConvention::Global
    );
    assert_eq!(
        convention(Path::new("dir/App_gpostaction.csproj")),
        FragmentConvention::Scoped
    );
    assert_eq!(
        convention(Path::new("dir/App_postaction.xaml")),
        FragmentConvention::Scoped
    );
}

#[test]
fn global_fragment_picks_first_sibling_without_marker() {
    let dir = TempDir::new().expect("temp dir");
    touch(&dir.path().join("Zeta.csproj"));
    touch(&dir.path().join("Alpha_postaction.csproj"));
    touch(&dir.path().join("Beta.csproj"));
    touch(&dir.path().join("Aardvark.cs"));
    let fragment = dir.path().join("$*_gpostaction.csproj");
    touch(&fragment);

    let target = resolve_target(&fragment).expect("resolve global");
    assert_eq!(target, Some(dir.path().join("Beta.csproj")));
}

#[test]
fn global_sibling_extension_match_ignores_case() {
    let dir = TempDir::new().expect("temp dir");
    touch(&dir.path().join("App.CSPROJ"));
    let fragment = dir.path().join("$*_gpostaction.csproj");
    touch(&fragment);

    let target = resolve_target(&fragment).expect("resolve global");
    assert_eq!(target, Some(dir.path().join("App.CSPROJ")));
}

#[test]
fn global_fragment_without_sibling_resolves_to_none() {
    let dir = TempDir::new().expect("temp dir");
    let fragment = dir.path().join("$*_gpostaction.csproj");
    touch(&fragment);
    touch(&dir.path().join("Other_failedpostaction.csproj"));

    let target = resolve_target(&fragment).expect("resolve global");
    assert_eq!(target, None);
}

#[test]
fn intent_path_keeps_stem_for_both_conventions() {
    assert_eq!(
        intent_path(Path::new("/out/App_postaction.xaml")),
        Path::new("/out/App_postaction.md")
    );
    assert_eq!(
        intent_path(Path::new("/out/$*_gpostaction.csproj")),
        Path::new("/out/$*_gpostaction.md")
    );
}

#[test]
fn fragment_detection_skips_intent_and_quarantined_files() {
    assert!(is_fragment(Path::new("App_postaction.xaml")));
    assert!(is_fragment(Path::new("$*_gpostaction.csproj")));
    assert!(is_fragment(Path::new("Package$App_gpostaction.appxmanifest")));
    assert!(!is_fragment(Path::new("App_postaction.md")));
    assert!(!is_fragment(Path::new("App_failedpostaction.xaml")));
    assert!(!is_fragment(Path::new("App_failedpostaction2.xaml")));
    assert!(!is_fragment(Path::new("App.xaml")));
}
