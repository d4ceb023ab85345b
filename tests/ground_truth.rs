use std::fs;
use std::path::Path;

use anyhow::Result;
use rstest::rstest;
use tempfile::TempDir;
use travellens::eval::scan_ground_truth;

fn touch(dir: &Path, name: &str) -> Result<()> {
    fs::write(dir.join(name), b"fake image data")?;
    Ok(())
}

#[test]
fn scan_groups_by_directory() -> Result<()> {
    let root = TempDir::new()?;
    let bridge = root.path().join("bridge");
    let tower = root.path().join("tower");
    fs::create_dir(&bridge)?;
    fs::create_dir(&tower)?;

    touch(&bridge, "a.jpg")?;
    touch(&bridge, "b.PNG")?;
    touch(&tower, "c.jpeg")?;
    // 根目录文件不属于任何标签，非图片后缀被过滤
    touch(root.path(), "stray.jpg")?;
    touch(&tower, "notes.txt")?;

    let ground_truth = scan_ground_truth(root.path(), "jpg,jpeg,png");

    assert_eq!(ground_truth.len(), 2);
    assert_eq!(ground_truth["bridge"].len(), 2);
    assert_eq!(ground_truth["tower"].len(), 1);
    assert!(ground_truth["tower"][0].ends_with("c.jpeg"));
    Ok(())
}

#[test]
fn scan_empty_directory() -> Result<()> {
    let root = TempDir::new()?;
    assert!(scan_ground_truth(root.path(), "jpg,jpeg,png").is_empty());
    Ok(())
}

#[rstest]
#[case::jpg_only("jpg", 1)]
#[case::all_suffixes("jpg,jpeg,png", 3)]
fn scan_honors_suffix_filter(#[case] suffix: &str, #[case] expected: usize) -> Result<()> {
    let root = TempDir::new()?;
    let label = root.path().join("lighthouse");
    fs::create_dir(&label)?;
    touch(&label, "a.jpg")?;
    touch(&label, "b.jpeg")?;
    touch(&label, "c.png")?;

    let ground_truth = scan_ground_truth(root.path(), suffix);
    assert_eq!(ground_truth["lighthouse"].len(), expected);
    Ok(())
}

#[test]
fn scan_sorts_images_within_label() -> Result<()> {
    let root = TempDir::new()?;
    let label = root.path().join("bridge");
    fs::create_dir(&label)?;
    touch(&label, "b.jpg")?;
    touch(&label, "a.jpg")?;

    let ground_truth = scan_ground_truth(root.path(), "jpg");
    let names = ground_truth["bridge"]
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().to_string())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["a.jpg", "b.jpg"]);
    Ok(())
}
