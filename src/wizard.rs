//! Course authoring wizard: step order and per-course session state.

use std::collections::BTreeSet;
use std::fmt;

use tracing::debug;

use crate::curriculum::{ContentId, CourseId, SectionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WizardStep {
    CourseInformation,
    IntendedLearners,
    Curriculum,
    Pricing,
    Promotions,
    Announcements,
    Messages,
}

impl WizardStep {
    pub const ALL: [WizardStep; 7] = [
        WizardStep::CourseInformation,
        WizardStep::IntendedLearners,
        WizardStep::Curriculum,
        WizardStep::Pricing,
        WizardStep::Promotions,
        WizardStep::Announcements,
        WizardStep::Messages,
    ];

    /// 1-based position in the wizard.
    pub fn number(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0) + 1
    }

    pub fn next(self) -> Option<WizardStep> {
        Self::ALL.get(self.number()).copied()
    }

    /// Route segment under the course-management area.
    pub fn slug(self) -> &'static str {
        match self {
            WizardStep::CourseInformation => "information",
            WizardStep::IntendedLearners => "intended-learners",
            WizardStep::Curriculum => "curriculum",
            WizardStep::Pricing => "pricing",
            WizardStep::Promotions => "promotions",
            WizardStep::Announcements => "announcements",
            WizardStep::Messages => "messages",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::CourseInformation => "Course Information",
            WizardStep::IntendedLearners => "Intended Learners",
            WizardStep::Curriculum => "Curriculum",
            WizardStep::Pricing => "Pricing",
            WizardStep::Promotions => "Promotions",
            WizardStep::Announcements => "Announcements",
            WizardStep::Messages => "Messages",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub step: usize,
    pub total: usize,
}

impl Progress {
    pub fn fraction(&self) -> f32 {
        self.step as f32 / self.total as f32
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {} of {}", self.step, self.total)
    }
}

/// Where the UI should go after an editor action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Stay,
    Step(WizardStep),
    CourseList,
    /// Session expired; the caller routes to its login flow.
    Login,
    /// Question authoring happens in the separate quiz flow.
    QuizAuthoring {
        course_id: CourseId,
        section_id: SectionId,
        content_id: ContentId,
    },
}

/// Course being authored plus wizard progress. Created on wizard entry,
/// consumed by [`WizardSession::finish`] or [`WizardSession::exit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardSession {
    course_id: CourseId,
    current: WizardStep,
    completed: BTreeSet<WizardStep>,
}

impl WizardSession {
    pub fn begin(course_id: CourseId) -> Self {
        Self::resume_at(course_id, WizardStep::CourseInformation)
    }

    /// Enters an existing course's wizard directly at `step`.
    pub fn resume_at(course_id: CourseId, step: WizardStep) -> Self {
        debug!(course = %course_id, step = step.slug(), "wizard session started");
        Self {
            course_id,
            current: step,
            completed: BTreeSet::new(),
        }
    }

    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    pub fn current(&self) -> WizardStep {
        self.current
    }

    pub fn go_to(&mut self, step: WizardStep) {
        self.current = step;
    }

    pub fn is_completed(&self, step: WizardStep) -> bool {
        self.completed.contains(&step)
    }

    /// Marks `step` done and moves to the step after it. The last step
    /// stays current.
    pub fn complete(&mut self, step: WizardStep) -> WizardStep {
        self.completed.insert(step);
        self.current = step.next().unwrap_or(step);
        self.current
    }

    pub fn progress(&self) -> Progress {
        Progress {
            step: self.current.number(),
            total: WizardStep::ALL.len(),
        }
    }

    /// Leaves the wizard after every step is done.
    pub fn finish(self) -> CourseId {
        debug!(course = %self.course_id, "wizard finished");
        self.course_id
    }

    /// Leaves the wizard early, e.g. after saving a draft.
    pub fn exit(self) -> CourseId {
        debug!(course = %self.course_id, step = self.current.slug(), "wizard exited");
        self.course_id
    }
}
