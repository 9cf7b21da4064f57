//! Shared fixtures for view builder tests.

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::models::lenient::parse_timestamp;
use crate::models::RoleMatcher;

use super::snapshot::Snapshot;

pub fn at(raw: &str) -> NaiveDateTime {
    parse_timestamp(raw).unwrap()
}

pub fn roles() -> RoleMatcher {
    RoleMatcher {
        teacher_role_id: "t-role".to_string(),
        student_role_id: "s-role".to_string(),
    }
}

pub fn decode<T: DeserializeOwned>(value: serde_json::Value) -> Vec<T> {
    serde_json::from_value(value).unwrap()
}

/// A small school: two teachers, two students, three instruments.
///
/// - package 4 belongs to an unknown student and an unknown instrument
/// - payment 3 points at a package that does not exist
/// - lesson 5 was taught by an unknown teacher
/// - teacher t1 has a duplicated relation row for student s1
pub fn fixture_snapshot() -> Snapshot {
    Snapshot {
        users: decode(json!([
            {"id": "t1", "first_name": "Tina", "last_name": "Teach", "role": "t-role"},
            {"id": "t2", "first_name": "Tom", "last_name": "Tutor", "role": {"id": "x", "name": "Teacher"}},
            {"id": "s1", "first_name": "Sam", "last_name": "Student", "role": "s-role"},
            {"id": "s2", "first_name": "Sue", "last_name": "Singer", "role": "s-role"},
            {"id": "a1", "first_name": "Ann", "last_name": "Admin", "role": "admin-role"}
        ])),
        instruments: decode(json!([
            {"id": 1, "name": "Piano"},
            {"id": 2, "name": "Violin"},
            {"id": 3, "name": "Cello"}
        ])),
        packages: decode(json!([
            {"id": 1, "name": "Piano 10", "student": "s1", "instrument": 1, "duration": 45,
             "lessons_quota": 10, "status": "active", "start_datetime": "2024-01-01T00:00:00"},
            {"id": 2, "name": "Violin 5", "student": "s2", "instrument": 2, "duration": 30,
             "lessons_quota": 5, "status": "completed", "start_datetime": "2023-12-01T00:00:00",
             "end_datetime": "2024-02-28T00:00:00", "remarks": "Exam prep"},
            {"id": 3, "name": "Piano 10", "student": "s2", "instrument": 1, "duration": 60,
             "lessons_quota": 0, "status": "draft"},
            {"id": 4, "name": "Trial", "student": "ghost", "instrument": 99, "duration": 30,
             "lessons_quota": 2, "status": "expired"}
        ])),
        lessons: decode(json!([
            {"id": 1, "package": 1, "teacher": "t1", "start_datetime": "2024-01-05T10:00:00", "status": "attended"},
            {"id": 2, "package": 1, "teacher": "t1", "start_datetime": "2024-01-12T10:00:00", "status": "attended"},
            {"id": 3, "package": 2, "teacher": "t2", "start_datetime": "2024-01-20T15:30:00", "status": "cancelled", "remarks": "Sick"},
            {"id": 4, "package": 2, "teacher": "t2", "start_datetime": "2024-02-02T15:30:00", "status": "attended"},
            {"id": 5, "package": 1, "teacher": "ghost-teacher", "start_datetime": "2023-12-28T09:00:00", "status": "pending"}
        ])),
        payments: decode(json!([
            {"id": 1, "payment_id": "PAY-1", "rate": 100, "currency": "USD", "payment_date": "2024-01-15", "package": 1},
            {"id": 2, "payment_id": "PAY-2", "rate": "50", "currency": "USD", "payment_date": "2024-01-20", "package": 2},
            {"id": 3, "payment_id": "PAY-3", "rate": 200, "currency": "USD", "payment_date": "2024-02-01", "package": 404},
            {"id": 4, "payment_id": "PAY-4", "rate": 25, "currency": "USD", "payment_date": "2023-12-30", "package": 4}
        ])),
        relations: decode(json!([
            {"teacher": "t1", "student": "s1", "instrument": 1},
            {"teacher": "t1", "student": "s2", "instrument": 1},
            {"teacher": "t1", "student": "s1", "instrument": 1},
            {"teacher": "t2", "student": "s2", "instrument": 2},
            {"teacher": "t2", "student": "ghost", "instrument": 7}
        ])),
        student_instruments: decode(json!([
            {"instruments_id": 1},
            {"instruments_id": 1},
            {"instruments_id": 2},
            {"instruments_id": 3},
            {"instruments_id": 99}
        ])),
        teacher_instruments: decode(json!([
            {"instruments_id": 1},
            {"instruments_id": 2},
            {"instruments_id": 2}
        ])),
    }
}
