use assert_cmd::Command;
use predicates::str::contains;
use std::error::Error;
use std::path::PathBuf;
use tempfile::tempdir;

// Helper function to get the path to the compiled binary
fn medallion_cmd() -> Command {
    let mut cmd = Command::cargo_bin("medallion").expect("Failed to find medallion binary");
    cmd.env_remove("MEDALLION_FFMPEG");
    cmd
}

#[test]
fn test_encode_command_non_existent_input() -> Result<(), Box<dyn Error>> {
    let non_existent_input = PathBuf::from("surely/this/does/not/exist/input.mp4");

    medallion_cmd()
        .arg("encode")
        .arg("--input")
        .arg(&non_existent_input)
        .arg("--crop")
        .arg("720:0:0")
        .assert()
        .code(1)
        .stderr(contains("Invalid input path").count(1));

    Ok(())
}

#[test]
fn test_encode_command_refuses_existing_output() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input_file = dir.path().join("clip.mp4");
    std::fs::write(&input_file, "dummy content")?;
    std::fs::write(dir.path().join("clip.webp"), "existing badge")?;

    medallion_cmd()
        .arg("encode")
        .arg("-i")
        .arg(&input_file)
        .arg("--crop")
        .arg("720:0:0")
        .assert()
        .code(1)
        .stderr(contains("already exists"));

    assert_eq!(std::fs::read(dir.path().join("clip.webp"))?, b"existing badge");
    Ok(())
}

#[test]
fn test_encode_command_missing_ffmpeg() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input_file = dir.path().join("clip.mp4");
    std::fs::write(&input_file, "dummy content")?;

    medallion_cmd()
        .arg("encode")
        .arg("-i")
        .arg(&input_file)
        .arg("--crop")
        .arg("720:0:0")
        .arg("--max-size-mb")
        .arg("--ffmpeg")
        .arg("/nonexistent/medallion/ffmpeg")
        .assert()
        .code(1)
        .stderr(contains("Required dependency not found"));

    let leftovers: Vec<_> = std::fs::read_dir(dir.path())?.collect();
    assert_eq!(leftovers.len(), 1, "only the input should remain");
    Ok(())
}

#[test]
fn test_encode_command_invalid_quality() -> Result<(), Box<dyn Error>> {
    medallion_cmd()
        .args(["encode", "-i", "clip.mp4", "--crop", "720:0:0", "--quality", "101"])
        .assert()
        .code(2);
    Ok(())
}

#[test]
fn test_encode_command_size_limit_out_of_range() -> Result<(), Box<dyn Error>> {
    medallion_cmd()
        .args(["encode", "-i", "clip.mp4", "--crop", "720:0:0", "--max-size-mb", "0"])
        .assert()
        .code(2);
    Ok(())
}

#[test]
fn test_encode_command_requires_crop() -> Result<(), Box<dyn Error>> {
    medallion_cmd()
        .args(["encode", "-i", "clip.mp4"])
        .assert()
        .code(2)
        .stderr(contains("--crop"));
    Ok(())
}

#[test]
fn test_help_lists_encode() -> Result<(), Box<dyn Error>> {
    medallion_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("encode"));
    Ok(())
}
