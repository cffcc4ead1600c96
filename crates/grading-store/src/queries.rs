//! SQL used by the PostgreSQL store.
//!
//! Grades page in `created_at` order so repeated requests see a stable
//! window when nothing is written in between. Scale entries come back
//! highest threshold first, which is the order GPA resolution expects.

/// One page of grades, oldest first. Binds: `$1` limit, `$2` offset.
pub const SELECT_GRADES_PAGE: &str =
    "SELECT student_id, course_id, grade FROM grade ORDER BY created_at, id LIMIT $1 OFFSET $2";

/// Count of every grade row.
pub const COUNT_GRADES: &str = "SELECT count(*) FROM grade";

/// Entries of one scale. Binds: `$1` scale type.
pub const SELECT_SCALE: &str = "SELECT min, gpa FROM scale WHERE type = $1 ORDER BY min DESC";

/// Record a grade. Binds: `$1` student, `$2` course, `$3` grade.
pub const INSERT_GRADE: &str = "INSERT INTO grade (student_id, course_id, grade) VALUES ($1, $2, $3)";

/// Add or replace one scale threshold. Binds: `$1` type, `$2` min, `$3` gpa.
pub const UPSERT_SCALE_ENTRY: &str = "INSERT INTO scale (type, min, gpa) VALUES ($1, $2, $3) \
     ON CONFLICT (type, min) DO UPDATE SET gpa = EXCLUDED.gpa";
