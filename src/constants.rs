pub const OK_RESPONSE: &str = "HTTP/1.1 200 OK";
pub const CREATED: &str = "HTTP/1.1 201 Created";
pub const NO_CONTENT: &str = "HTTP/1.1 204 No Content";
pub const BAD_REQUEST: &str = "HTTP/1.1 400 Bad Request";
pub const UNAUTHORIZED: &str = "HTTP/1.1 401 Unauthorized";
pub const NOT_FOUND: &str = "HTTP/1.1 404 NOT FOUND";
pub const CONFLICT: &str = "HTTP/1.1 409 Conflict";
pub const INTERNAL_ERROR: &str = "HTTP/1.1 500 INTERNAL ERROR";

pub const TOKEN_HEADER: &str = "x-access-token";

/// Flat amount credited to a referrer when someone signs up with their username.
pub const REFERRAL_BONUS: f64 = 15.0;
/// Share of every deposit credited to the depositor's upline.
pub const UPLINE_COMMISSION_PERCENT: f64 = 10.0;
/// Accrual window of an investment, in milliseconds (3 days).
pub const INVESTMENT_DURATION_MS: i64 = 259_200_000;
/// Day offset used for an investment's `endDate`. Disagrees with the window above.
pub const END_DATE_OFFSET_DAYS: i64 = 432_000;

pub const REGISTER_TOKEN_HOURS: i64 = 1;
pub const LOGIN_TOKEN_DAYS: i64 = 7;
