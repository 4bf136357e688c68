//! Synthetic listing pages shared by the crawler tests

/// Renders one registration row with the portal's cell layout
pub fn record_row(
    index: usize,
    student_id: &str,
    section_code: &str,
    course_name: &str,
    group_label: &str,
    credits: &str,
) -> String {
    format!(
        concat!(
            r#"<tr class="odd"><td style="width: 20px">{}</td><td style="width: 40px">{}</td>"#,
            r#"<td style="width: 100px">Nguyễn Văn A</td><td style="width: 60px">01/01/2004</td>"#,
            r#"<td style="width: 100px">QH-2022-I/CQ-C-A</td><td style="width: 50px">{}</td>"#,
            r#"<td style="width: 160px">{}</td><td style="width: 15px">{}</td>"#,
            r#"<td style="width: 15px">{}</td><td style="width: 60px"></td>"#,
            r#"<td style="width: 140px; display:none">{}</td></tr>"#
        ),
        index, student_id, section_code, course_name, group_label, credits, index
    )
}

/// Renders the result count announcement
pub fn count_line(first: u64, last: u64, total: u64) -> String {
    format!("Kết quả từ {} tới {} trên {}.", first, last, total)
}

/// Renders a full listing page around the given rows
pub fn listing_page(rows: &[String], count: Option<(u64, u64, u64)>) -> String {
    let summary = count
        .map(|(first, last, total)| count_line(first, last, total))
        .unwrap_or_default();

    format!(
        concat!(
            "<html><head><title>Danh sách sinh viên đăng ký lớp môn học</title></head><body>\n",
            "<div class=\"summary\">{}</div>\n",
            "<table class=\"items\"><tbody>\n{}\n</tbody></table>\n",
            "</body></html>"
        ),
        summary,
        rows.join("\n")
    )
}
