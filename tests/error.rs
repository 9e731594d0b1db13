use std::path::PathBuf;

use taskflow::error::{exit_codes, Error};

#[test]
fn exit_codes_split_user_and_operation_errors() {
    assert_eq!(Error::TaskNotFound(1).exit_code(), exit_codes::USER_ERROR);
    assert_eq!(Error::CategoryNotFound(1).exit_code(), exit_codes::USER_ERROR);
    assert_eq!(
        Error::InvalidArgument("x".to_string()).exit_code(),
        exit_codes::USER_ERROR
    );
    assert_eq!(
        Error::UnsupportedFileType {
            name: "a.exe".to_string(),
            accept: ".pdf".to_string(),
        }
        .exit_code(),
        exit_codes::USER_ERROR
    );
    assert_eq!(
        Error::LockFailed(PathBuf::from("/tmp/x.lock")).exit_code(),
        exit_codes::OPERATION_FAILED
    );
    assert_eq!(
        Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk")).exit_code(),
        exit_codes::OPERATION_FAILED
    );
}

#[test]
fn upload_messages_match_the_widget_text() {
    let too_large = Error::FileTooLarge {
        name: "video.mp4".to_string(),
        size: 20 * 1024 * 1024,
        max: "10 MB".to_string(),
    };
    assert_eq!(too_large.to_string(), "File size must be less than 10 MB");

    let unsupported = Error::UnsupportedFileType {
        name: "a.exe".to_string(),
        accept: ".pdf,.png".to_string(),
    };
    assert_eq!(
        unsupported.to_string(),
        "File type not supported. Accepted types: .pdf,.png"
    );
}

#[test]
fn details_identify_missing_records() {
    let details = Error::TaskNotFound(9).details().expect("details");
    assert_eq!(details["entity"], "task");
    assert_eq!(details["id"], 9);

    assert!(Error::CategoryNotFound(2).is_not_found());
    assert!(!Error::InvalidArgument("x".to_string()).is_not_found());
    assert!(Error::OperationFailed("x".to_string()).details().is_none());
}
