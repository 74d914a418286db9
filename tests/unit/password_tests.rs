use backend_lib::auth::{
    check_password_strength, hash_password, verify_password, PasswordRequirements,
};
use backend_lib::config::HashSettings;

fn cheap() -> HashSettings {
    HashSettings {
        log_n: 4,
        r: 8,
        p: 1,
    }
}

#[test]
fn test_password_hashing_and_verification() {
    let password = "test1234";
    let hash = hash_password(password, cheap().params().unwrap()).unwrap();

    assert_ne!(password, hash);
    assert!(hash.starts_with("$scrypt$"));
    assert!(verify_password(&hash, password));
    assert!(!verify_password(&hash, "test12345"));
    assert!(!verify_password("not a phc string", password));
}

#[test]
fn test_same_password_gets_different_salts() {
    let a = hash_password("test1234", cheap().params().unwrap()).unwrap();
    let b = hash_password("test1234", cheap().params().unwrap()).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_password_strength_validation() {
    let requirements = PasswordRequirements::default();

    assert!(check_password_strength("test1234", &requirements).is_ok());
    assert!(check_password_strength("abc12", &requirements).is_err());
    assert!(check_password_strength(&"x".repeat(129), &requirements).is_err());

    let strict = PasswordRequirements {
        min_length: 8,
        require_uppercase: true,
        require_digit: true,
        ..PasswordRequirements::default()
    };
    assert!(check_password_strength("Secure123", &strict).is_ok());
    assert!(check_password_strength("secure123", &strict).is_err());
    assert!(check_password_strength("SecurePass", &strict).is_err());
}
