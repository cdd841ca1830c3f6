use thiserror::Error;

/// Length of a phone number in the phone-mapping table / 手机号位数
pub const PHONE_DIGITS: usize = 8;

/// Which lookup a well-formed request asks for / 搜索方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchMode {
    ByIdentifier(String),
    ByPhone(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please search by UID or phone, not both at the same time.")]
    ConflictingInputs,
    #[error("Enter a UID or an 8-digit phone number to search.")]
    MissingInput,
    #[error("Phone number must be exactly 8 digits.")]
    MalformedPhone,
}

/// Check that exactly one of uid / phone is given and the phone is well-formed
/// 校验 uid 与手机号二选一，且手机号为 8 位数字
pub fn validate_inputs(uid: &str, phone: &str) -> Result<SearchMode, ValidationError> {
    match (uid.is_empty(), phone.is_empty()) {
        (false, false) => Err(ValidationError::ConflictingInputs),
        (true, true) => Err(ValidationError::MissingInput),
        (false, true) => Ok(SearchMode::ByIdentifier(uid.to_string())),
        (true, false) => {
            if is_valid_phone(phone) {
                Ok(SearchMode::ByPhone(phone.to_string()))
            } else {
                Err(ValidationError::MalformedPhone)
            }
        }
    }
}

fn is_valid_phone(phone: &str) -> bool {
    phone.len() == PHONE_DIGITS && phone.bytes().all(|b| b.is_ascii_digit())
}
