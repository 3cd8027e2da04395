//! SQL schema for the Lodge SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// `rooms.current_resident` and `residents.room_id` form a deliberate
/// back-reference pair; only the resident side carries a FOREIGN KEY so the
/// pair stays insertable in either order. The store keeps the two sides
/// consistent inside transactions.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    full_name     TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE,  -- stored lowercase
    password_hash TEXT NOT NULL,         -- argon2 PHC string
    role          TEXT NOT NULL,
    floor         INTEGER,
    active        INTEGER NOT NULL DEFAULT 1,
    resident_id   TEXT,
    created_at    TEXT NOT NULL          -- ISO 8601 UTC
);

CREATE TABLE IF NOT EXISTS rooms (
    room_id          TEXT PRIMARY KEY,
    number           INTEGER NOT NULL UNIQUE,
    floor            INTEGER NOT NULL,
    occupied         INTEGER NOT NULL DEFAULT 0,
    current_resident TEXT
);

CREATE TABLE IF NOT EXISTS residents (
    resident_id      TEXT PRIMARY KEY,
    full_name        TEXT NOT NULL,
    id_number        TEXT NOT NULL UNIQUE,
    student_code     INTEGER NOT NULL UNIQUE,
    email            TEXT,
    academic_program TEXT,
    period           TEXT,
    admission_year   INTEGER,
    phone            TEXT,
    room_id          TEXT REFERENCES rooms(room_id),
    user_id          TEXT,
    enrolled_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS reports (
    report_id    TEXT PRIMARY KEY,
    resident_id  TEXT NOT NULL REFERENCES residents(resident_id),
    date         TEXT NOT NULL,
    reason       TEXT NOT NULL,
    action_taken TEXT,
    urgent       INTEGER NOT NULL DEFAULT 0,
    location     TEXT,
    description  TEXT,
    created_by   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS assemblies (
    assembly_id         TEXT PRIMARY KEY,
    title               TEXT NOT NULL,
    assembly_type       TEXT NOT NULL,   -- 'general' | 'floor'
    date                TEXT NOT NULL,
    time                TEXT NOT NULL,
    location            TEXT NOT NULL,
    description         TEXT,
    attendance_present  INTEGER,
    attendance_total    INTEGER,
    status              TEXT NOT NULL DEFAULT 'Programada',
    postponement_reason TEXT,
    new_date            TEXT,
    new_time            TEXT,
    created_by          TEXT NOT NULL,
    floor               INTEGER,         -- set iff assembly_type = 'floor'
    created_at          TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS measures (
    measure_id  TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    description TEXT NOT NULL,
    status      TEXT NOT NULL DEFAULT 'Activa',
    resident_id TEXT NOT NULL REFERENCES residents(resident_id),
    created_by  TEXT NOT NULL,
    resolved_by TEXT,                    -- written at most once
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS news (
    news_id      TEXT PRIMARY KEY,
    title        TEXT NOT NULL,
    content      TEXT NOT NULL,
    news_type    TEXT NOT NULL,          -- 'general' | 'floor'
    floor        INTEGER,                -- set iff news_type = 'floor'
    published_at TEXT NOT NULL,
    created_by   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS services (
    service_id  TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    description TEXT,
    schedule    TEXT,
    room_id     TEXT NOT NULL REFERENCES rooms(room_id)
);

CREATE INDEX IF NOT EXISTS residents_room_idx   ON residents(room_id);
CREATE INDEX IF NOT EXISTS residents_user_idx   ON residents(user_id);
CREATE INDEX IF NOT EXISTS reports_resident_idx ON reports(resident_id);
CREATE INDEX IF NOT EXISTS measures_resident_idx ON measures(resident_id);
CREATE INDEX IF NOT EXISTS rooms_floor_idx      ON rooms(floor);
CREATE INDEX IF NOT EXISTS services_room_idx    ON services(room_id);

PRAGMA user_version = 1;
";
