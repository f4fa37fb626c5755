use std::collections::BTreeMap;

/// Opaque student identifier (roll number, registration id, ...).
pub type StudentId = String;

/// Opaque faculty (supervisor) identifier.
pub type FacultyId = String;

/// Faculty id -> ranked students, index 0 = most wanted.
///
/// The allocator consumes this map: every accepted student is removed from
/// every list, so what is left after a run is not meaningful to callers.
pub type FacultyPreferences = BTreeMap<FacultyId, Vec<StudentId>>;

/// Faculty ids in original input row order. Only used for output layout.
pub type FacultyOrder = Vec<FacultyId>;

/// One student and their ranked faculty choices (most preferred first).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StudentRecord {
    pub id: StudentId,
    pub preferences: Vec<FacultyId>,
}

impl StudentRecord {
    pub fn new<S, I, F>(id: S, preferences: I) -> Self
    where
        S: Into<StudentId>,
        I: IntoIterator<Item = F>,
        F: Into<FacultyId>,
    {
        Self {
            id: id.into(),
            preferences: preferences.into_iter().map(Into::into).collect(),
        }
    }

    /// Faculty choice at `rank`, if the student listed that many.
    pub fn choice_at(&self, rank: usize) -> Option<&FacultyId> {
        self.preferences.get(rank)
    }
}

/// A single acceptance, recorded in the order it happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    pub student: StudentId,
    pub faculty: FacultyId,
    /// Preference level (0-based) at which the match committed.
    pub round: usize,
}

/// Faculty id -> students accepted so far, in acceptance order.
///
/// Created with one empty list per known faculty, grows monotonically while
/// the round loop runs and is read-only afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AllocationState {
    lists: BTreeMap<FacultyId, Vec<StudentId>>,
}

impl AllocationState {
    /// Empty state with a slot for every faculty in `faculties`.
    pub fn with_faculties<'a, I>(faculties: I) -> Self
    where
        I: IntoIterator<Item = &'a FacultyId>,
    {
        Self {
            lists: faculties
                .into_iter()
                .map(|f| (f.clone(), Vec::new()))
                .collect(),
        }
    }

    pub(crate) fn push(&mut self, faculty: &str, student: StudentId) {
        if let Some(list) = self.lists.get_mut(faculty) {
            list.push(student);
        }
    }

    /// Number of students accepted by `faculty` (0 for unknown faculties).
    pub fn load(&self, faculty: &str) -> usize {
        self.lists.get(faculty).map(Vec::len).unwrap_or(0)
    }

    /// Students accepted by `faculty`, or `None` if the faculty is unknown.
    pub fn students_for(&self, faculty: &str) -> Option<&[StudentId]> {
        self.lists.get(faculty).map(Vec::as_slice)
    }

    /// The faculty that accepted `student`, if any.
    pub fn faculty_of(&self, student: &str) -> Option<&FacultyId> {
        self.lists
            .iter()
            .find(|(_, list)| list.iter().any(|s| s == student))
            .map(|(f, _)| f)
    }

    pub fn is_allocated(&self, student: &str) -> bool {
        self.faculty_of(student).is_some()
    }

    /// Total students placed across all faculties.
    pub fn allocated_count(&self) -> usize {
        self.lists.values().map(Vec::len).sum()
    }

    pub fn faculty_count(&self) -> usize {
        self.lists.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FacultyId, &[StudentId])> + '_ {
        self.lists.iter().map(|(f, l)| (f, l.as_slice()))
    }

    /// Every allocated student, faculty by faculty.
    pub fn allocated_students(&self) -> impl Iterator<Item = &StudentId> + '_ {
        self.lists.values().flatten()
    }

    pub fn into_inner(self) -> BTreeMap<FacultyId, Vec<StudentId>> {
        self.lists
    }
}

impl From<BTreeMap<FacultyId, Vec<StudentId>>> for AllocationState {
    fn from(lists: BTreeMap<FacultyId, Vec<StudentId>>) -> Self {
        Self { lists }
    }
}
