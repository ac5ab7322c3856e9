use bake_domain::{DomainError, Image, ImageLifecycleState, InstanceLifecycleState, LaunchMode, NicAttachmentType};

#[test]
fn test_instance_state_roundtrip() {
    // as_str y FromStr deben ser inversos para todos los estados
    let states = [InstanceLifecycleState::Provisioning,
                  InstanceLifecycleState::Starting,
                  InstanceLifecycleState::Running,
                  InstanceLifecycleState::Stopping,
                  InstanceLifecycleState::Stopped,
                  InstanceLifecycleState::Terminating,
                  InstanceLifecycleState::Terminated];
    for s in states {
        let parsed: InstanceLifecycleState = s.as_str().parse().unwrap();
        assert_eq!(parsed, s);
    }
}

#[test]
fn test_instance_state_parse_is_case_insensitive() {
    let parsed: InstanceLifecycleState = "running".parse().unwrap();
    assert_eq!(parsed, InstanceLifecycleState::Running);
}

#[test]
fn test_instance_state_parse_rejects_unknown() {
    let err = "FLYING".parse::<InstanceLifecycleState>().unwrap_err();
    assert!(matches!(err, DomainError::ValidationError(_)));
}

#[test]
fn test_only_terminated_is_terminal() {
    assert!(InstanceLifecycleState::Terminated.is_terminal());
    assert!(!InstanceLifecycleState::Running.is_terminal());
    assert!(!InstanceLifecycleState::Terminating.is_terminal());
}

#[test]
fn test_launch_mode_parse() {
    assert_eq!("paravirtualized".parse::<LaunchMode>().unwrap(), LaunchMode::Paravirtualized);
    assert!("HYPER".parse::<LaunchMode>().is_err());
}

#[test]
fn test_nic_attachment_parse() {
    assert_eq!("VFIO".parse::<NicAttachmentType>().unwrap(), NicAttachmentType::Vfio);
    assert!("VIRTIO".parse::<NicAttachmentType>().is_err());
}

#[test]
fn test_provisional_image_has_only_id() {
    let img = Image::provisional("ocid1.image.oc1..abc").unwrap();
    assert_eq!(img.id, "ocid1.image.oc1..abc");
    assert_eq!(img.lifecycle_state, ImageLifecycleState::Provisioning);
    assert!(img.display_name.is_none());
    assert!(!img.is_available());
}

#[test]
fn test_provisional_image_rejects_empty_id() {
    assert!(Image::provisional("  ").is_err());
}

#[test]
fn test_image_serde_roundtrip_uses_screaming_states() {
    let mut img = Image::provisional("ocid1.image.oc1..abc").unwrap();
    img.lifecycle_state = ImageLifecycleState::Available;
    img.launch_mode = Some(LaunchMode::Native);
    let json = serde_json::to_value(&img).unwrap();
    assert_eq!(json["lifecycle_state"], "AVAILABLE");
    assert_eq!(json["launch_mode"], "NATIVE");
    let back: Image = serde_json::from_value(json).unwrap();
    assert_eq!(back, img);
}
