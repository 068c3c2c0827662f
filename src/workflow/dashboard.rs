//! Dashboard aggregation.
//!
//! The dashboard is advisory. Per-form failures in the bar chart produce a
//! zeroed bar and a failure to enumerate forms produces an empty chart, so a
//! single bad row never blanks the page.

use super::FormService;
use crate::error::Result;
use crate::store::FormStats;
use crate::types::{DashboardMetrics, DecisionStatus, Form, FormBar, Percentages, RecentView};

pub const DEFAULT_RECENT_LIMIT: i64 = 5;

/// Name shown for a bar whose counts could not be computed.
pub const UNKNOWN_FORM_NAME: &str = "Unknown form";

/// `part` as a whole percentage of `total`, rounded half up. Zero when
/// `total` is zero.
#[must_use]
pub fn percent(part: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    (part * 200 + total) / (total * 2)
}

#[must_use]
pub fn compute_metrics(
    total_forms: i64,
    total_submissions: i64,
    pending: i64,
    approved: i64,
    rejected: i64,
) -> DashboardMetrics {
    let total = pending + approved + rejected;
    DashboardMetrics {
        total_forms,
        total_submissions,
        pending,
        approved,
        rejected,
        percentages: Percentages {
            pending: percent(pending, total),
            approved: percent(approved, total),
            rejected: percent(rejected, total),
        },
    }
}

fn form_bar<S: FormStats + ?Sized>(stats: &S, form: &Form) -> Result<FormBar> {
    let total_assigned = stats.count_form_assignments(form.id)?;
    let submitted = stats.count_form_responses(form.id)?;
    Ok(FormBar {
        form_id: form.id,
        form_name: form.name.clone(),
        total_assigned,
        submitted,
        not_submitted: (total_assigned - submitted).max(0),
    })
}

/// Assigned versus submitted counts for every active form.
pub fn build_bar_chart<S: FormStats + ?Sized>(stats: &S) -> Vec<FormBar> {
    let forms = match stats.list_active_forms() {
        Ok(forms) => forms,
        Err(e) => {
            tracing::error!("Failed to list active forms for dashboard: {e}");
            return Vec::new();
        }
    };

    forms
        .iter()
        .map(|form| {
            form_bar(stats, form).unwrap_or_else(|e| {
                tracing::error!(form_id = form.id, "Failed to compute form counts: {e}");
                FormBar {
                    form_id: form.id,
                    form_name: UNKNOWN_FORM_NAME.to_string(),
                    total_assigned: 0,
                    submitted: 0,
                    not_submitted: 0,
                }
            })
        })
        .collect()
}

impl FormService {
    pub fn dashboard_metrics(&self) -> Result<DashboardMetrics> {
        Ok(compute_metrics(
            self.store.count_forms()?,
            self.store.count_responses()?,
            self.store.count_undecided_responses()?,
            self.store.count_approvals(DecisionStatus::Approved)?,
            self.store.count_approvals(DecisionStatus::Rejected)?,
        ))
    }

    pub fn bar_chart_data(&self) -> Vec<FormBar> {
        build_bar_chart(self.store.as_ref())
    }

    /// Latest non-spam responses, newest first.
    pub fn top_recent_responses(&self, n: i64) -> Result<Vec<RecentView>> {
        if n <= 0 {
            return Ok(Vec::new());
        }
        self.store.recent_responses(n)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::{Value, json};

    use super::*;
    use crate::error::Error;
    use crate::types::{
        ApprovalState, Decision, FormStatus, Percentages, Submission, SubmissionStatus,
    };
    use crate::workflow::testing::{Harness, new_form};

    struct FlakyStats {
        forms: Vec<Form>,
        broken_form: Option<i64>,
        fail_listing: bool,
        assigned: i64,
        submitted: i64,
    }

    fn form(id: i64, name: &str) -> Form {
        Form {
            id,
            name: name.to_string(),
            description: None,
            schema: Value::Null,
            status: FormStatus::Active,
            created_at: Utc::now().fixed_offset(),
            url: None,
        }
    }

    impl FormStats for FlakyStats {
        fn list_active_forms(&self) -> Result<Vec<Form>> {
            if self.fail_listing {
                return Err(Error::Unavailable("database locked".to_string()));
            }
            Ok(self.forms.clone())
        }

        fn count_form_assignments(&self, form_id: i64) -> Result<i64> {
            if self.broken_form == Some(form_id) {
                return Err(Error::Unavailable("disk I/O error".to_string()));
            }
            Ok(self.assigned)
        }

        fn count_form_responses(&self, _form_id: i64) -> Result<i64> {
            Ok(self.submitted)
        }
    }

    #[test]
    fn test_percent_rounding_and_zero_guard() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(5, 0), 0);
        assert_eq!(percent(1, 1), 100);
        assert_eq!(percent(1, 4), 25);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 3), 33);
    }

    #[test]
    fn test_metrics_with_no_responses() {
        let metrics = compute_metrics(3, 0, 0, 0, 0);
        assert_eq!(metrics.percentages, Percentages::default());
        assert_eq!(metrics.total_forms, 3);
    }

    #[test]
    fn test_bar_clamps_not_submitted() {
        let stats = FlakyStats {
            forms: vec![form(1, "Intake")],
            broken_form: None,
            fail_listing: false,
            assigned: 3,
            submitted: 5,
        };

        let bars = build_bar_chart(&stats);
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].total_assigned, 3);
        assert_eq!(bars[0].submitted, 5);
        assert_eq!(bars[0].not_submitted, 0);
    }

    #[test]
    fn test_bar_failure_isolated_per_form() {
        let stats = FlakyStats {
            forms: vec![form(1, "Good"), form(2, "Broken"), form(3, "Also good")],
            broken_form: Some(2),
            fail_listing: false,
            assigned: 4,
            submitted: 1,
        };

        let bars = build_bar_chart(&stats);
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].not_submitted, 3);
        assert_eq!(
            bars[1],
            FormBar {
                form_id: 2,
                form_name: UNKNOWN_FORM_NAME.to_string(),
                total_assigned: 0,
                submitted: 0,
                not_submitted: 0,
            }
        );
        assert_eq!(bars[2].form_name, "Also good");
    }

    #[test]
    fn test_bar_chart_empty_when_listing_fails() {
        let stats = FlakyStats {
            forms: vec![form(1, "Good")],
            broken_form: None,
            fail_listing: true,
            assigned: 1,
            submitted: 1,
        };

        assert!(build_bar_chart(&stats).is_empty());
    }

    #[test]
    fn test_bar_chart_only_active_forms() {
        let h = Harness::new();
        let draft = h.service.create_form(new_form("Draft")).unwrap();
        let active = h.service.create_form(new_form("Active")).unwrap();
        h.service.activate_form(active.id).unwrap();
        h.service.assign_form(active.id, h.user.id, h.admin.id).unwrap();
        h.service.assign_form(draft.id, h.user.id, h.admin.id).unwrap();

        let bars = h.service.bar_chart_data();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].form_id, active.id);
        assert_eq!(bars[0].total_assigned, 1);
        assert_eq!(bars[0].not_submitted, 1);
    }

    #[test]
    fn test_top_recent_truncates() {
        let h = Harness::new();
        let form = h.service.create_form(new_form("Survey")).unwrap();
        h.service.assign_form(form.id, h.user.id, h.admin.id).unwrap();

        for i in 0..7 {
            h.service
                .submit(Submission {
                    form_id: form.id,
                    user_id: h.user.id,
                    data: json!({ "i": i }),
                    file: None,
                    is_spam: i == 6,
                    assigned_by: None,
                })
                .unwrap()
                .unwrap();
        }

        let recent = h.service.top_recent_responses(DEFAULT_RECENT_LIMIT).unwrap();
        assert_eq!(recent.len(), 5);
        assert!(
            recent
                .windows(2)
                .all(|w| w[0].submitted_at >= w[1].submitted_at)
        );
        assert!(h.service.top_recent_responses(0).unwrap().is_empty());
    }

    #[test]
    fn test_vendor_intake_scenario() {
        let h = Harness::new();

        let form = h.service.create_form(new_form("Vendor Intake")).unwrap();
        assert_eq!(form.status, FormStatus::Draft);
        h.service.assign_form(form.id, h.user.id, h.admin.id).unwrap();
        assert!(h.service.activate_form(form.id).unwrap());

        let response = h
            .service
            .submit(Submission {
                form_id: form.id,
                user_id: h.user.id,
                data: json!({"company": "Acme"}),
                file: None,
                is_spam: false,
                assigned_by: Some(h.admin.id),
            })
            .unwrap()
            .unwrap();

        let assigned = h.service.assigned_forms_for_user(h.user.id).unwrap();
        assert_eq!(assigned[0].submission_status, SubmissionStatus::Complete);

        h.service
            .decide(
                response.id,
                Decision {
                    status: DecisionStatus::Approved,
                    comment: Some("looks good".to_string()),
                    decided_by: h.admin.id,
                },
            )
            .unwrap();

        let responses = h.service.list_responses(false).unwrap();
        assert_eq!(responses[0].status, ApprovalState::Approved);
        assert_eq!(responses[0].comment.as_deref(), Some("looks good"));

        let metrics = h.service.dashboard_metrics().unwrap();
        assert_eq!(metrics.total_forms, 1);
        assert_eq!(metrics.total_submissions, 1);
        assert_eq!((metrics.pending, metrics.approved, metrics.rejected), (0, 1, 0));
        assert_eq!(
            metrics.percentages,
            Percentages {
                pending: 0,
                approved: 100,
                rejected: 0,
            }
        );
    }
}
