use crate::{InvalidNameReason, ModelError};

/// Whether `ch` may start a Java identifier.
#[inline]
pub fn is_identifier_start(ch: char) -> bool {
    ch == '_' || ch == '$' || unicode_ident::is_xid_start(ch)
}

/// Whether `ch` may appear after the first character of a Java identifier.
#[inline]
pub fn is_identifier_part(ch: char) -> bool {
    ch == '$' || ch == '_' || unicode_ident::is_xid_continue(ch)
}

/// Validate a (possibly dotted) class name such as `java.util.List` or `Foo`.
///
/// The first character must start an identifier; every following character is either an
/// identifier part or a `.` separator, with no `..` and no trailing `.`. Runs in a single pass.
pub fn validate_class_name(name: &str) -> Result<(), ModelError> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(ModelError::invalid_name(name, InvalidNameReason::Empty));
    };
    if !is_identifier_start(first) {
        return Err(ModelError::invalid_name(
            name,
            InvalidNameReason::InvalidStart(first),
        ));
    }

    let mut prev = first;
    for ch in chars {
        if ch == '.' {
            if prev == '.' {
                return Err(ModelError::invalid_name(
                    name,
                    InvalidNameReason::ConsecutiveDots,
                ));
            }
        } else if !is_identifier_part(ch) {
            return Err(ModelError::invalid_name(
                name,
                InvalidNameReason::IllegalCharacter(ch),
            ));
        }
        prev = ch;
    }

    if prev == '.' {
        return Err(ModelError::invalid_name(name, InvalidNameReason::TrailingDot));
    }
    Ok(())
}

/// Shorthand for [`validate_class_name`].
#[inline]
pub fn validate(name: &str) -> Result<(), ModelError> {
    validate_class_name(name)
}

/// Validate a single identifier segment (no `.` separators).
pub fn validate_identifier(name: &str) -> Result<(), ModelError> {
    validate_class_name(name)?;
    if name.contains('.') {
        return Err(ModelError::invalid_name(
            name,
            InvalidNameReason::IllegalCharacter('.'),
        ));
    }
    Ok(())
}

/// Validate a package name. The empty string denotes the default package.
pub fn validate_package_name(package: &str) -> Result<(), ModelError> {
    if package.is_empty() {
        return Ok(());
    }
    validate_class_name(package)
}

/// Join a package and a simple name. Types in the default package have no leading dot.
pub fn qualify(package: &str, simple_name: &str) -> String {
    if package.is_empty() {
        simple_name.to_owned()
    } else {
        format!("{package}.{simple_name}")
    }
}

/// Last segment of a dotted name.
pub fn simple_name_of(qualified: &str) -> &str {
    qualified
        .rsplit_once('.')
        .map_or(qualified, |(_, simple)| simple)
}

/// Everything before the last `.` of a dotted name, or `""` for an undotted name.
pub fn package_of(qualified: &str) -> &str {
    qualified
        .rsplit_once('.')
        .map_or("", |(package, _)| package)
}
